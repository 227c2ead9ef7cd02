use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::{CollectionMapping, Document, FieldMapping};

/// One catalog item. Holds data only; price and stock rules are enforced by
/// the service layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Sweet {
    id: Option<Uuid>,
    name: String,
    category: String,
    price: f64,
    quantity: i32,
    image_url: String,
}

impl Sweet {
    pub fn new(
        id: Option<Uuid>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        quantity: i32,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            price,
            quantity,
            image_url: image_url.into(),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<Uuid>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = price;
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        self.image_url = image_url.into();
    }
}

impl Document for Sweet {
    const MAPPING: CollectionMapping = CollectionMapping {
        collection: "sweets",
        key: "id",
        fields: &[
            FieldMapping::new("id", "id"),
            FieldMapping::new("name", "name"),
            FieldMapping::new("category", "category"),
            FieldMapping::new("price", "price"),
            FieldMapping::new("quantity", "quantity"),
            FieldMapping::new("imageUrl", "image_url"),
        ],
    };

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn gulab_jamun() -> Sweet {
        Sweet::new(
            Some(Uuid::new_v4()),
            "Gulab Jamun",
            "Indian",
            5.0,
            20,
            "https://cdn.example.com/img.png",
        )
    }

    #[test]
    fn default_is_an_empty_deserialization_target() {
        let sweet = Sweet::default();

        assert_eq!(sweet.id(), None);
        assert_eq!(sweet.name(), "");
        assert_eq!(sweet.category(), "");
        assert_eq!(sweet.price(), 0.0);
        assert_eq!(sweet.quantity(), 0);
        assert_eq!(sweet.image_url(), "");

        let from_empty: Sweet = serde_json::from_value(json!({})).unwrap();
        assert_eq!(from_empty, sweet);
    }

    #[test]
    fn document_round_trip_preserves_fields() {
        let sweet = gulab_jamun();

        let document = serde_json::to_value(&sweet).unwrap();
        assert_eq!(document["imageUrl"], "https://cdn.example.com/img.png");
        assert_eq!(document["price"], 5.0);

        let back: Sweet = serde_json::from_value(document).unwrap();
        assert_eq!(back, sweet);
    }

    #[test]
    fn unstored_sweet_serializes_null_id() {
        let sweet = Sweet::new(None, "Barfi", "Indian", 2.5, 3, "");
        let document = serde_json::to_value(&sweet).unwrap();
        assert_eq!(document["id"], Value::Null);
    }

    #[test]
    fn equality_is_structural() {
        let sweet = gulab_jamun();
        assert_eq!(sweet.clone(), sweet);

        let mutations: [fn(&mut Sweet); 6] = [
            |s: &mut Sweet| s.set_id(Some(Uuid::new_v4())),
            |s: &mut Sweet| s.set_name("Rasgulla"),
            |s: &mut Sweet| s.set_category("Bengali"),
            |s: &mut Sweet| s.set_price(5.5),
            |s: &mut Sweet| s.set_quantity(19),
            |s: &mut Sweet| s.set_image_url("https://cdn.example.com/other.png"),
        ];

        for mutate in mutations {
            let mut changed = sweet.clone();
            mutate(&mut changed);
            assert_ne!(changed, sweet);
        }
    }

    #[test]
    fn mapping_covers_every_document_key() {
        let document = serde_json::to_value(Sweet::default()).unwrap();
        let mut keys: Vec<&str> = document
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        let mut mapped: Vec<&str> = Sweet::MAPPING.fields.iter().map(|f| f.key).collect();
        mapped.sort_unstable();

        assert_eq!(keys, mapped);
        assert_eq!(Sweet::MAPPING.collection, "sweets");
        assert_eq!(Sweet::MAPPING.key_column(), "id");
    }

    #[test]
    fn entity_does_not_validate() {
        let sweet = Sweet::new(None, "", "", -1.0, -4, "");
        assert_eq!(sweet.price(), -1.0);
        assert_eq!(sweet.quantity(), -4);
    }
}
