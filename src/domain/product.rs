//! Product domain model
//!
//! This module defines the Product record moved between delimited files and
//! the persistence store.

use super::errors::FerryError;
use super::ids::ProductId;
use super::Result;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A product record
///
/// `id` is only present once the record has been written to (or loaded from)
/// the store; records read from an import file never carry one.
///
/// # Examples
///
/// ```
/// use ferry::domain::product::ProductBuilder;
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let product = ProductBuilder::new()
///     .name("Widget")
///     .description("A small widget")
///     .price(BigDecimal::from_str("9.99").unwrap())
///     .quantity(100)
///     .build()
///     .unwrap();
///
/// assert!(product.id.is_none());
/// assert!(product.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier
    pub id: Option<ProductId>,

    /// Product name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Unit price
    pub price: BigDecimal,

    /// Units in stock
    pub quantity: i64,
}

impl Product {
    /// Creates a new builder for constructing a Product
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }

    /// Returns a copy of this product carrying the given id
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// Checks the invariants a store enforces on write
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Validation` when the name is blank, or the price
    /// or quantity is negative.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FerryError::Validation(
                "product name cannot be empty".to_string(),
            ));
        }

        if self.price < BigDecimal::zero() {
            return Err(FerryError::Validation(format!(
                "product '{}' has negative price {}",
                self.name, self.price
            )));
        }

        if self.quantity < 0 {
            return Err(FerryError::Validation(format!(
                "product '{}' has negative quantity {}",
                self.name, self.quantity
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(
                f,
                "Product[id={id}, name={}, price={}, quantity={}]",
                self.name, self.price, self.quantity
            ),
            None => write!(
                f,
                "Product[name={}, price={}, quantity={}]",
                self.name, self.price, self.quantity
            ),
        }
    }
}

/// Builder for constructing Product instances
///
/// Only `name` is required; description defaults to empty, price and quantity
/// to zero.
#[derive(Debug, Default)]
pub struct ProductBuilder {
    id: Option<ProductId>,
    name: Option<String>,
    description: Option<String>,
    price: Option<BigDecimal>,
    quantity: Option<i64>,
}

impl ProductBuilder {
    /// Creates a new ProductBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store id
    pub fn id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the price
    pub fn price(mut self, price: BigDecimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the quantity
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Builds the Product
    ///
    /// # Errors
    ///
    /// Returns an error if the name is missing
    pub fn build(self) -> std::result::Result<Product, String> {
        Ok(Product {
            id: self.id,
            name: self.name.ok_or("name is required")?,
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or_else(BigDecimal::zero),
            quantity: self.quantity.unwrap_or(0),
        })
    }
}
