use ae_core::{Article, EnrichedRecord, Error, Result};

/// Name the export is offered under when downloaded.
pub const EXPORT_FILENAME: &str = "enhanced_articles.csv";
pub const EXPORT_HEADER: [&str; 5] = ["title", "link", "original_summary", "relevance_score", "blog_post"];

/// Encode records as UTF-8 CSV, header first, one row per record in input order.
pub fn encode(records: &[EnrichedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER).map_err(export_error)?;
    for record in records {
        let score = record.article.score.map(|s| s.to_string()).unwrap_or_default();
        writer
            .write_record([
                record.article.title.as_str(),
                record.article.link.as_str(),
                record.article.summary.as_str(),
                score.as_str(),
                record.blog_post.as_str(),
            ])
            .map_err(export_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Export(e.to_string()))
}

/// Parse a file produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Vec<EnrichedRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader.headers().map_err(export_error)?;
    if headers.iter().ne(EXPORT_HEADER.iter().copied()) {
        return Err(Error::Export(format!("Unexpected header row: {:?}", headers)));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(export_error)?;
        if row.len() != EXPORT_HEADER.len() {
            return Err(Error::Export(format!("Expected {} fields, found {}", EXPORT_HEADER.len(), row.len())));
        }
        let score = match &row[3] {
            "" => None,
            raw => Some(
                raw.parse::<f64>()
                    .map_err(|e| Error::Export(format!("Invalid relevance score {:?}: {}", raw, e)))?,
            ),
        };
        records.push(EnrichedRecord::new(
            Article {
                title: row[0].to_string(),
                link: row[1].to_string(),
                summary: row[2].to_string(),
                score,
            },
            &row[4],
        ));
    }
    Ok(records)
}

fn export_error(e: csv::Error) -> Error {
    Error::Export(e.to_string())
}
