//! Tantivy schema for the Keyword Index (spec §3 field list). Grounded on
//! the teacher's `search/text_search.rs` schema construction, generalized
//! from 4 fields to the full chunk field list plus a JSON `meta` field
//! standing in for the per-attribute `meta_{k}` mirrors — tantivy's schema
//! is fixed at index-creation time, so dynamic per-key fields are folded
//! into one indexed JSON object instead.

use tantivy::schema::{
    Field, IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, TextOptions, FAST,
    STORED, STRING,
};

#[derive(Debug, Clone)]
pub struct KeywordSchema {
    pub schema: Schema,
    pub document_id: Field,
    pub content: Field,
    pub entity_name: Field,
    pub entity_name_keyword: Field,
    pub language: Field,
    pub entity_type: Field,
    pub file_path: Field,
    pub repository: Field,
    pub doc_summary: Field,
    pub start_line: Field,
    pub end_line: Field,
    pub start_byte: Field,
    pub end_byte: Field,
    pub meta: Field,
}

fn positional_text() -> TextOptions {
    TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer("default")
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored()
}

impl KeywordSchema {
    pub fn build() -> Self {
        let mut builder = Schema::builder();

        let document_id = builder.add_text_field("document_id", STRING | STORED);
        let content = builder.add_text_field("content", positional_text());
        let entity_name = builder.add_text_field("entity_name", positional_text());
        let entity_name_keyword = builder.add_text_field("entity_name_keyword", STRING | STORED);
        let language = builder.add_text_field("language", STRING | STORED);
        let entity_type = builder.add_text_field("entity_type", STRING | STORED);
        let file_path = builder.add_text_field("file_path", STRING | STORED);
        let repository = builder.add_text_field("repository", STRING | STORED);
        let doc_summary = builder.add_text_field("doc_summary", positional_text());
        let start_line = builder.add_u64_field("start_line", STORED | FAST);
        let end_line = builder.add_u64_field("end_line", STORED | FAST);
        let start_byte = builder.add_u64_field("start_byte", STORED);
        let end_byte = builder.add_u64_field("end_byte", STORED);
        let meta = builder.add_json_field("meta", JsonObjectOptions::default().set_stored());

        let schema = builder.build();

        Self {
            schema,
            document_id,
            content,
            entity_name,
            entity_name_keyword,
            language,
            entity_type,
            file_path,
            repository,
            doc_summary,
            start_line,
            end_line,
            start_byte,
            end_byte,
            meta,
        }
    }

    /// Resolve one of the exact-match STRING fields by name, used when
    /// compiling `SearchFilters` and `field:value` query nodes.
    pub fn exact_field(&self, name: &str) -> Option<Field> {
        match name {
            "language" => Some(self.language),
            "entity_type" => Some(self.entity_type),
            "file_path" => Some(self.file_path),
            "repository" => Some(self.repository),
            "entity_name_keyword" => Some(self.entity_name_keyword),
            "document_id" => Some(self.document_id),
            _ => None,
        }
    }

    /// Resolve one of the tokenized TEXT fields by name.
    pub fn text_field(&self, name: &str) -> Option<Field> {
        match name {
            "content" => Some(self.content),
            "entity_name" => Some(self.entity_name),
            "doc_summary" => Some(self.doc_summary),
            _ => None,
        }
    }
}
