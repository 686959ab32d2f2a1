//! Catalog API data model
//!
//! The backend serves its records with Spanish field names; every field also
//! accepts its English name so fixtures and future API versions decode alike.

use serde::{Deserialize, Serialize};

/// Response envelope shared by every catalog endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// `None` when the field is missing from the body
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default = "Option::default")]
    pub data: Option<T>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// Payload of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A racket record as returned by the catalog API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Racket {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default, alias = "nombre")]
    pub name: Option<String>,

    #[serde(default, alias = "marca")]
    pub brand: Option<String>,

    #[serde(default, alias = "modelo")]
    pub model: Option<String>,

    #[serde(default, alias = "imagen")]
    pub image: Option<String>,

    #[serde(default, alias = "es_bestseller")]
    pub is_bestseller: Option<bool>,

    #[serde(default, alias = "en_oferta")]
    pub on_sale: Option<bool>,

    #[serde(default, alias = "precio_actual")]
    pub current_price: Option<f64>,

    #[serde(default, alias = "precio_original")]
    pub original_price: Option<f64>,

    #[serde(default, alias = "descuento_porcentaje")]
    pub discount_percent: Option<f64>,

    #[serde(default, alias = "fuente")]
    pub source: Option<String>,

    #[serde(default, alias = "caracteristicas_forma")]
    pub shape: Option<String>,

    #[serde(default, alias = "caracteristicas_balance")]
    pub balance: Option<String>,

    #[serde(default, alias = "caracteristicas_nivel_de_juego")]
    pub play_level: Option<String>,
}

impl Racket {
    pub fn has_name(&self) -> bool {
        self.name.as_deref().map(|n| !n.trim().is_empty()).unwrap_or(false)
    }

    pub fn has_brand(&self) -> bool {
        self.brand.is_some()
    }

    pub fn has_price(&self) -> bool {
        self.current_price.is_some()
    }

    pub fn has_characteristics(&self) -> bool {
        self.shape.is_some() || self.balance.is_some()
    }

    /// Pricing is all-or-nothing: current price, discount and source come
    /// together. The original price may legitimately be null.
    pub fn pricing_is_complete(&self) -> bool {
        match self.current_price {
            Some(_) => self.discount_percent.is_some() && self.source.is_some(),
            None => {
                self.original_price.is_none() && self.discount_percent.is_none() && self.source.is_none()
            }
        }
    }

    /// True if the term appears in name, brand or model (case-insensitive)
    pub fn mentions(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.name, &self.brand, &self.model]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}
