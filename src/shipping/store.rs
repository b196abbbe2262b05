//! Shipping Storage
//! Mission: Persist shipping orders on the shared SQLite database

use crate::db::Database;
use crate::shipping::models::{NewShippingOrder, ShippingOrder};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;
use tracing::info;

/// Shipping order storage over the shared SQLite handle
pub struct ShippingStore {
    db: Database,
}

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShippingOrder> {
    Ok(ShippingOrder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        address: row.get(4)?,
        city: row.get(5)?,
        postal_code: row.get(6)?,
        description: row.get(7)?,
        weight: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl ShippingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert an order owned by `user_id`
    pub fn create(&self, user_id: i64, order: NewShippingOrder) -> Result<ShippingOrder> {
        let created_at = Utc::now().to_rfc3339();

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO shipping_orders (user_id, first_name, last_name, address, city, postal_code, description, weight, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                order.first_name,
                order.last_name,
                order.address,
                order.city,
                order.postal_code,
                order.description,
                order.weight,
                created_at,
            ],
        )
        .context("Failed to insert shipping order")?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!("✅ Created shipping order {} for user {}", id, user_id);

        Ok(ShippingOrder {
            id,
            user_id,
            first_name: order.first_name,
            last_name: order.last_name,
            address: order.address,
            city: order.city,
            postal_code: order.postal_code,
            description: order.description,
            weight: order.weight,
            created_at,
        })
    }

    /// A user's orders, newest first
    pub fn for_user(&self, user_id: i64) -> Result<Vec<ShippingOrder>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, first_name, last_name, address, city, postal_code, description, weight, created_at
             FROM shipping_orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let orders = stmt
            .query_map(params![user_id], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// Single order scoped to its owner; anyone else's id reads as absent
    pub fn find_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<ShippingOrder>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, first_name, last_name, address, city, postal_code, description, weight, created_at
             FROM shipping_orders WHERE id = ?1 AND user_id = ?2",
        )?;

        let order_result = stmt.query_row(params![order_id, user_id], row_to_order);

        match order_result {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every order in the system, newest first
    pub fn all(&self) -> Result<Vec<ShippingOrder>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, first_name, last_name, address, city, postal_code, description, weight, created_at
             FROM shipping_orders ORDER BY created_at DESC, id DESC",
        )?;

        let orders = stmt
            .query_map([], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// Cross-user lookup by id
    pub fn find_by_id(&self, order_id: i64) -> Result<Option<ShippingOrder>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, user_id, first_name, last_name, address, city, postal_code, description, weight, created_at
             FROM shipping_orders WHERE id = ?1",
        )?;

        let order_result = stmt.query_row(params![order_id], row_to_order);

        match order_result {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
