pub mod dispatcher;
pub mod extractor;
pub mod ingest;
pub mod prompt;
