//! SQL assembly over the DICOM metadata warehouse

use crate::{ExecutionConfig, FilterSpec};

const STUDY_TABLE: &str = "`dicom.metadataView`";
const EMBEDDINGS_TABLE: &str = "`dicom.metadataEmbeddings`";
const EMBEDDING_MODEL: &str = "`dicom.embedding_model`";

/// Statically assigned projection: the LLM never chooses columns, because
/// LLM-chosen projections are non-deterministic and would vary the response
/// shape between requests.
const STUDY_PROJECTION: &str = "\
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.PatientID')) AS PatientID,
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.PatientName')) AS PatientName,
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.PatientAge')) AS PatientAge,
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.PatientSex')) AS PatientSex,
  JSON_VALUE(meta.metadata, '$.StudyInstanceUID') AS StudyInstanceUID,
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.StudyDescription')) AS StudyDescription,
  ANY_VALUE(JSON_VALUE(meta.metadata, '$.StudyDate')) AS StudyDate,
  STRING_AGG(DISTINCT JSON_VALUE(meta.metadata, '$.Modality'), \"/\") AS Modality,
  COUNT(DISTINCT JSON_VALUE(meta.metadata, '$.SeriesInstanceUID')) AS NumberOfSeries,
  COUNT(DISTINCT JSON_VALUE(meta.metadata, '$.SOPInstanceUID')) AS NumberOfInstances";

/// How the assembled query should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Execute with `LIMIT limit+1 OFFSET offset`; the extra row signals
    /// that more results exist.
    Paginated { limit: i64, offset: i64 },
    /// Execute the count-wrapped form and return only the total.
    CountOnly,
    /// Return the query text without executing it.
    DryRun,
}

/// The final query text plus its execution mode. Built fresh per request,
/// never cached or reused.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub sql: String,
    pub mode: QueryMode,
}

/// Assemble the final SQL for a normalized filter and execution config.
///
/// `count_only` wraps the base query in an outer COUNT(*) (with the trailing
/// ORDER BY stripped, since ordering is meaningless under a count).
/// `dry_run` overrides the mode tag but the SQL text is still produced so
/// the caller can inspect it.
pub fn build_query(filter: &FilterSpec, config: &ExecutionConfig) -> QueryPlan {
    let base = base_query(filter);

    if config.count_only {
        return QueryPlan {
            sql: wrap_in_count(&base),
            mode: if config.dry_run {
                QueryMode::DryRun
            } else {
                QueryMode::CountOnly
            },
        };
    }

    QueryPlan {
        sql: format!("{base}\nLIMIT {} OFFSET {}", config.limit + 1, config.offset),
        mode: if config.dry_run {
            QueryMode::DryRun
        } else {
            QueryMode::Paginated {
                limit: config.limit,
                offset: config.offset,
            }
        },
    }
}

/// Build the base SELECT: fixed projection, optional vector-search join,
/// filter predicate, one row per study.
///
/// When no predicate survives normalization the query defaults to
/// `WHERE FALSE`: an empty or unparseable filter yields zero rows rather
/// than the whole archive (fail-safe; the permissive WHERE TRUE variant was
/// considered and rejected, see DESIGN.md).
fn base_query(filter: &FilterSpec) -> String {
    let vector_phrase = filter.vector_phrase();

    let mut sql = format!("SELECT\n{STUDY_PROJECTION}");
    if vector_phrase.is_some() {
        sql.push_str(
            ",\n  CASE WHEN MIN(vector_search.distance) IS NULL THEN 1.0 \
             ELSE MIN(vector_search.distance) END AS VectorSearchDistance",
        );
    }

    sql.push_str(&format!("\nFROM\n  {STUDY_TABLE} AS meta"));

    if let Some(phrase) = vector_phrase {
        sql.push_str(&vector_search_join(phrase));
    }

    let predicate = filter
        .where_clause
        .as_deref()
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .unwrap_or("FALSE");
    sql.push_str(&format!("\nWHERE {predicate}"));

    sql.push_str("\nGROUP BY StudyInstanceUID");

    if vector_phrase.is_some() {
        sql.push_str("\nORDER BY VectorSearchDistance ASC");
    }

    sql
}

/// Left-join the embedding search so unmatched studies survive with the
/// worst-possible distance (1.0) instead of being filtered out.
fn vector_search_join(phrase: &str) -> String {
    let escaped = escape_string_literal(phrase);
    format!(
        "\nLEFT JOIN VECTOR_SEARCH(
  TABLE {EMBEDDINGS_TABLE}, 'ml_generate_embedding_result',
  (
    SELECT ml_generate_embedding_result, content AS query
    FROM ML.GENERATE_EMBEDDING(
      MODEL {EMBEDDING_MODEL},
      (SELECT '{escaped}' AS content))
  ),
  top_k => 1000, options => '{{\"fraction_lists_to_search\": 0.01}}') AS vector_search
  ON meta.path = vector_search.base.path AND meta.version = vector_search.base.version"
    )
}

/// Wrap the base query in an outer count, stripping the trailing ORDER BY.
/// The builder only ever appends a single trailing ORDER BY clause, so a
/// suffix search is sufficient.
fn wrap_in_count(base: &str) -> String {
    let stripped = match base.rfind("\nORDER BY") {
        Some(pos) => &base[..pos],
        None => base,
    };
    format!("SELECT COUNT(*) AS totalCount FROM ( {stripped} )")
}

/// Double single quotes so the phrase is safe to interpolate as a string
/// literal. This is the only injection mitigation applied: the whereClause
/// itself is interpolated verbatim (documented risk, it comes from the
/// translation step and is not separately sanitized).
fn escape_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}
