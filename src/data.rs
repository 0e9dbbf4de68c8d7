use serde::{Deserialize, Serialize};

/// One entry of the product catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
}

impl Product {
    #[must_use]
    pub fn new(id: i64, name: &str, price: f64, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// One polled measurement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl Metric {
    #[must_use]
    pub fn new(name: &str, value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
        }
    }

    #[must_use]
    pub fn display_value(&self) -> String {
        if self.unit.is_empty() {
            format!("{:.1}", self.value)
        } else {
            format!("{:.1} {}", self.value, self.unit)
        }
    }
}

/// The full catalog served by the demo endpoints
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        Product::new(1, "Trail Runner", 129.99, "Lightweight shoe with a rock plate"),
        Product::new(2, "Summit Pack", 89.5, "28L daypack with hydration sleeve"),
        Product::new(3, "Storm Shell", 219.0, "Three-layer waterproof jacket"),
        Product::new(4, "Camp Mug", 14.25, "Insulated steel mug with lid"),
        Product::new(5, "Headlamp", 39.99, "400 lumen rechargeable headlamp"),
        Product::new(6, "Trek Poles", 74.0, "Collapsible carbon trekking poles"),
    ]
}

/// A short subset of the catalog
#[must_use]
pub fn featured() -> Vec<Product> {
    catalog()
        .into_iter()
        .filter(|p| matches!(p.id, 3 | 5))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_shape() {
        let json = r#"[{"id":7,"name":"Tent","price":349.5,"description":"Two person"}]"#;
        let parsed: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, vec![Product::new(7, "Tent", 349.5, "Two person")]);
    }

    #[test]
    fn test_metric_unit_is_optional() {
        let parsed: Metric = serde_json::from_str(r#"{"name":"queue","value":3}"#).unwrap();
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.display_value(), "3.0");
    }

    #[test]
    fn test_display_price() {
        assert_eq!(Product::new(1, "x", 4.5, "").display_price(), "$4.50");
    }

    #[test]
    fn test_featured_is_subset() {
        let all = catalog();
        assert!(featured().iter().all(|p| all.contains(p)));
        assert_eq!(featured().len(), 2);
    }
}
