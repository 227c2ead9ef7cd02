//! Explicit persistence mapping for stored records.
//!
//! Every entity declares the collection it lives in, the document key that
//! identifies it and how each document key maps onto a storage column. The
//! statements used by the query modules are generated from that declaration.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Key as it appears in the serialized document.
    pub key: &'static str,
    /// Backing column in the collection's table.
    pub column: &'static str,
}

impl FieldMapping {
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self { key, column }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionMapping {
    pub collection: &'static str,
    /// Document key of the identifier field. Must be one of `fields`.
    pub key: &'static str,
    pub fields: &'static [FieldMapping],
}

impl CollectionMapping {
    pub fn columns(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn column_for(&self, key: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.column)
    }

    pub fn key_column(&self) -> &'static str {
        self.column_for(self.key).unwrap_or(self.key)
    }

    /// Fields in declaration order, identifier excluded.
    pub fn data_fields(&self) -> impl Iterator<Item = &'static FieldMapping> + '_ {
        self.fields.iter().filter(move |field| field.key != self.key)
    }

    pub fn select_all_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.columns(), self.collection)
    }

    pub fn select_by_key_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.columns(),
            self.collection,
            self.key_column()
        )
    }

    /// Insert of every data field, binds in `data_fields` order. The store
    /// assigns the identifier.
    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.data_fields().map(|field| field.column).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.collection,
            columns.join(", "),
            placeholders.join(", "),
            self.columns()
        )
    }

    /// Partial update: each data field is bound in `data_fields` order and a
    /// NULL bind keeps the stored value. The identifier is the last bind.
    pub fn coalesce_update_sql(&self) -> String {
        let assignments: Vec<String> = self
            .data_fields()
            .enumerate()
            .map(|(i, field)| format!("{0} = COALESCE(${1}, {0})", field.column, i + 1))
            .collect();

        format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            self.collection,
            assignments.join(", "),
            self.key_column(),
            assignments.len() + 1,
            self.columns()
        )
    }

    /// Overwrites a single field: `$1` is the value, `$2` the identifier.
    pub fn set_field_sql(&self, key: &str) -> Option<String> {
        let column = self.column_for(key)?;

        Some(format!(
            "UPDATE {} SET {} = $1 WHERE {} = $2 RETURNING {}",
            self.collection,
            column,
            self.key_column(),
            self.columns()
        ))
    }

    pub fn delete_by_key_sql(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = $1",
            self.collection,
            self.key_column()
        )
    }
}

/// A record persisted as one document in its own collection.
pub trait Document {
    const MAPPING: CollectionMapping;

    /// Store-assigned identifier, `None` until the record has been inserted.
    fn id(&self) -> Option<Uuid>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: CollectionMapping = CollectionMapping {
        collection: "widgets",
        key: "id",
        fields: &[
            FieldMapping::new("id", "id"),
            FieldMapping::new("displayName", "display_name"),
            FieldMapping::new("size", "size"),
        ],
    };

    #[test]
    fn columns_follow_declaration_order() {
        assert_eq!(WIDGETS.columns(), "id, display_name, size");
        assert_eq!(WIDGETS.key_column(), "id");
        assert_eq!(WIDGETS.column_for("displayName"), Some("display_name"));
        assert_eq!(WIDGETS.column_for("missing"), None);
    }

    #[test]
    fn insert_skips_identifier() {
        assert_eq!(
            WIDGETS.insert_sql(),
            "INSERT INTO widgets (display_name, size) VALUES ($1, $2) \
             RETURNING id, display_name, size"
        );
    }

    #[test]
    fn coalesce_update_binds_identifier_last() {
        assert_eq!(
            WIDGETS.coalesce_update_sql(),
            "UPDATE widgets SET display_name = COALESCE($1, display_name), \
             size = COALESCE($2, size) WHERE id = $3 RETURNING id, display_name, size"
        );
    }

    #[test]
    fn set_field_requires_a_mapped_key() {
        assert_eq!(
            WIDGETS.set_field_sql("size").as_deref(),
            Some("UPDATE widgets SET size = $1 WHERE id = $2 RETURNING id, display_name, size")
        );
        assert!(WIDGETS.set_field_sql("colour").is_none());
    }

    #[test]
    fn select_and_delete_use_key_column() {
        assert_eq!(
            WIDGETS.select_by_key_sql(),
            "SELECT id, display_name, size FROM widgets WHERE id = $1"
        );
        assert_eq!(WIDGETS.delete_by_key_sql(), "DELETE FROM widgets WHERE id = $1");
    }
}
