pub mod query_extractor;
