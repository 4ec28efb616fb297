//! Prompt construction for the natural-language translation call

/// Sample of the metadata document shape, embedded in the prompt so the
/// model only references field names that actually exist.
const SAMPLE_DOCUMENT: &str = r#"{
  "PatientID": "PID-00042",
  "PatientName": "DOE^JANE",
  "PatientAge": "047Y",
  "PatientSex": "F",
  "StudyInstanceUID": "1.2.840.113619.2.55.3.604688119.971.1448031138.486",
  "StudyDescription": "CT CHEST W/O CONTRAST",
  "StudyDate": "20240117",
  "SeriesInstanceUID": "1.2.840.113619.2.55.3.604688119.971.1448031138.487",
  "SOPInstanceUID": "1.2.840.113619.2.55.3.604688119.971.1448031138.488",
  "Modality": "CT",
  "BodyPartExamined": "CHEST",
  "TransferSyntaxUID": "1.2.840.10008.1.2.4.90"
}"#;

/// Build the translation prompt for a natural-language request.
///
/// Pure text construction: the output is a function of the input plus the
/// fixed template and sample document above. The instructions require the
/// model to keep deterministic filters (whereClause) strictly separate from
/// the embedding-search fields, and to use SAFE_CAST so that a failed cast
/// yields NULL instead of a query error.
pub fn generate_prompt(natural_language: &str) -> String {
    format!(
        r#"Given the request "{natural_language}", break it up and return a JSON object with exactly these four keys:

- "whereClause": A deterministic filter over DICOM metadata stored as a JSON column named 'metadata' in a BigQuery table. Express it as a boolean SQL WHERE-clause body. Always read fields with JSON_VALUE(metadata, '$.FieldName') and wrap typed comparisons in SAFE_CAST so a failed cast returns NULL rather than an error. Be sensitive to DICOM value representations for patient name, date, and age. Use this only for exact-match and range conditions.
- "textSearch": Keywords for a text-embedding similarity search over diagnostic reports and other text. Never put anything here that can be expressed as a deterministic whereClause condition.
- "imageSearch": Keywords for an image-embedding similarity search over rendered DICOM images. Same rule: no overlap with whereClause.
- "notes": Any notes about how you interpreted the request.

Use an empty string for keys that do not apply. Reference only field names that appear in this sample metadata document:

{SAMPLE_DOCUMENT}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_request_and_contract() {
        let prompt = generate_prompt("find CT studies of female patients");

        assert!(prompt.contains("find CT studies of female patients"));
        for key in ["whereClause", "textSearch", "imageSearch", "notes"] {
            assert!(prompt.contains(key), "missing key {key}");
        }
        assert!(prompt.contains("SAFE_CAST"));
        assert!(prompt.contains("JSON_VALUE"));
        assert!(prompt.contains("StudyInstanceUID"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(generate_prompt("abc"), generate_prompt("abc"));
    }
}
