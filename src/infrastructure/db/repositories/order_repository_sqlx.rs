use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::order_repository::{
    OrderDetail, OrderRepository, OrderRow, PaymentRow,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxOrderRepository {
    pub pool: PgPool,
}

impl SqlxOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PAYMENT_SQL: &str = r#"SELECT id, buyer_id, product_id, amount_cents, method, status,
           transaction_id, checkout_request_id, created_at, completed_at
    FROM payments"#;

// Detail rows join the order with its product, seller, buyer and payment;
// payment columns carry a pay_ prefix because both tables share names.
const DETAIL_SQL: &str = r#"SELECT o.id, o.buyer_id, o.product_id, o.payment_id, o.quantity,
           o.total_cents, o.delivery_status, o.delivery_address, o.phone_number,
           o.mpesa_receipt_number, o.created_at, o.delivered_at,
           pr.name AS product_name, s.business_name, b.display_name AS buyer_name,
           pay.id AS pay_id, pay.buyer_id AS pay_buyer_id,
           pay.product_id AS pay_product_id,
           pay.amount_cents AS pay_amount_cents, pay.method AS pay_method,
           pay.status AS pay_status,
           pay.transaction_id AS pay_transaction_id,
           pay.checkout_request_id AS pay_checkout_request_id,
           pay.created_at AS pay_created_at, pay.completed_at AS pay_completed_at
    FROM orders o
    JOIN products pr ON pr.id = o.product_id
    JOIN seller_profiles s ON s.id = pr.seller_id
    JOIN buyer_profiles b ON b.id = o.buyer_id
    LEFT JOIN payments pay ON pay.id = o.payment_id"#;

fn map_payment(r: &PgRow) -> PaymentRow {
    PaymentRow {
        id: r.get("id"),
        buyer_id: r.get("buyer_id"),
        product_id: r.get("product_id"),
        amount_cents: r.get("amount_cents"),
        method: r.get("method"),
        status: r.get("status"),
        transaction_id: r.try_get("transaction_id").ok(),
        checkout_request_id: r.try_get("checkout_request_id").ok(),
        created_at: r.get("created_at"),
        completed_at: r.try_get("completed_at").ok(),
    }
}

fn map_order(r: &PgRow) -> OrderRow {
    OrderRow {
        id: r.get("id"),
        buyer_id: r.get("buyer_id"),
        product_id: r.get("product_id"),
        payment_id: r.try_get("payment_id").ok(),
        quantity: r.get("quantity"),
        total_cents: r.get("total_cents"),
        delivery_status: r.get("delivery_status"),
        delivery_address: r.try_get("delivery_address").ok(),
        phone_number: r.try_get("phone_number").ok(),
        mpesa_receipt_number: r.try_get("mpesa_receipt_number").ok(),
        created_at: r.get("created_at"),
        delivered_at: r.try_get("delivered_at").ok(),
    }
}

fn map_detail(r: &PgRow) -> OrderDetail {
    let payment = r.try_get::<Uuid, _>("pay_id").ok().map(|id| PaymentRow {
        id,
        buyer_id: r.get("pay_buyer_id"),
        product_id: r.get("pay_product_id"),
        amount_cents: r.get("pay_amount_cents"),
        method: r.get("pay_method"),
        status: r.get("pay_status"),
        transaction_id: r.try_get("pay_transaction_id").ok(),
        checkout_request_id: r.try_get("pay_checkout_request_id").ok(),
        created_at: r.get("pay_created_at"),
        completed_at: r.try_get("pay_completed_at").ok(),
    });
    OrderDetail {
        order: map_order(r),
        product_name: r.get("product_name"),
        business_name: r.get("business_name"),
        buyer_name: r.get("buyer_name"),
        payment,
    }
}

#[async_trait]
impl OrderRepository for SqlxOrderRepository {
    async fn create_checkout(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        total_cents: i64,
        method: &str,
        phone_number: Option<&str>,
        delivery_address: Option<&str>,
    ) -> anyhow::Result<(PaymentRow, OrderRow)> {
        let mut tx = self.pool.begin().await?;
        let payment_row = sqlx::query(
            r#"INSERT INTO payments (buyer_id, product_id, amount_cents, method)
               VALUES ($1, $2, $3, $4)
               RETURNING id, buyer_id, product_id, amount_cents, method, status,
                         transaction_id, checkout_request_id, created_at, completed_at"#,
        )
        .bind(buyer_id)
        .bind(product_id)
        .bind(total_cents)
        .bind(method)
        .fetch_one(&mut *tx)
        .await?;
        let payment = map_payment(&payment_row);
        let order_row = sqlx::query(
            r#"INSERT INTO orders (buyer_id, product_id, payment_id, quantity, total_cents,
                                   delivery_address, phone_number)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, buyer_id, product_id, payment_id, quantity, total_cents,
                         delivery_status, delivery_address, phone_number,
                         mpesa_receipt_number, created_at, delivered_at"#,
        )
        .bind(buyer_id)
        .bind(product_id)
        .bind(payment.id)
        .bind(quantity)
        .bind(total_cents)
        .bind(delivery_address)
        .bind(phone_number)
        .fetch_one(&mut *tx)
        .await?;
        let order = map_order(&order_row);
        tx.commit().await?;
        Ok((payment, order))
    }

    async fn abort_checkout(&self, payment_id: Uuid, order_id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn attach_checkout_request(
        &self,
        payment_id: Uuid,
        checkout_request_id: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE payments SET checkout_request_id = $2 WHERE id = $1")
            .bind(payment_id)
            .bind(checkout_request_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn attach_transaction(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE payments SET transaction_id = $2 WHERE id = $1")
            .bind(payment_id)
            .bind(transaction_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_payment(&self, payment_id: Uuid) -> anyhow::Result<Option<PaymentRow>> {
        let row = sqlx::query(&format!("{PAYMENT_SQL} WHERE id = $1"))
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_payment(&r)))
    }

    async fn find_payment_by_checkout_request(
        &self,
        checkout_request_id: &str,
    ) -> anyhow::Result<Option<PaymentRow>> {
        let row = sqlx::query(&format!("{PAYMENT_SQL} WHERE checkout_request_id = $1"))
            .bind(checkout_request_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_payment(&r)))
    }

    async fn find_payment_by_transaction(
        &self,
        transaction_id: &str,
    ) -> anyhow::Result<Option<PaymentRow>> {
        let row = sqlx::query(&format!("{PAYMENT_SQL} WHERE transaction_id = $1"))
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_payment(&r)))
    }

    async fn settle(
        &self,
        payment_id: Uuid,
        receipt: Option<&str>,
    ) -> anyhow::Result<Option<PaymentRow>> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query(&format!("{PAYMENT_SQL} WHERE id = $1 FOR UPDATE"))
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        let payment = map_payment(&existing);
        if payment.status != "pending" {
            return Ok(Some(payment));
        }
        let updated = sqlx::query(
            r#"UPDATE payments
               SET status = 'completed', transaction_id = COALESCE($2, transaction_id),
                   completed_at = now()
               WHERE id = $1
               RETURNING id, buyer_id, product_id, amount_cents, method, status,
                         transaction_id, checkout_request_id, created_at, completed_at"#,
        )
        .bind(payment_id)
        .bind(receipt)
        .fetch_one(&mut *tx)
        .await?;
        let orders = sqlx::query(
            r#"UPDATE orders
               SET delivery_status = 'processing',
                   mpesa_receipt_number = COALESCE($2, mpesa_receipt_number)
               WHERE payment_id = $1 AND delivery_status = 'pending'
               RETURNING product_id, quantity"#,
        )
        .bind(payment_id)
        .bind(receipt)
        .fetch_all(&mut *tx)
        .await?;
        for order in orders {
            sqlx::query(
                r#"UPDATE products SET stock = GREATEST(stock - $2, 0), updated_at = now()
                   WHERE id = $1"#,
            )
            .bind(order.get::<Uuid, _>("product_id"))
            .bind(order.get::<i32, _>("quantity"))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(Some(map_payment(&updated)))
    }

    async fn fail_payment(&self, payment_id: Uuid) -> anyhow::Result<Option<PaymentRow>> {
        let row = sqlx::query(
            r#"UPDATE payments SET status = 'failed' WHERE id = $1 AND status = 'pending'
               RETURNING id, buyer_id, product_id, amount_cents, method, status,
                         transaction_id, checkout_request_id, created_at, completed_at"#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_payment(&r)))
    }

    async fn order_for_buyer(
        &self,
        order_id: Uuid,
        buyer_id: Uuid,
    ) -> anyhow::Result<Option<OrderDetail>> {
        let row = sqlx::query(&format!("{DETAIL_SQL} WHERE o.id = $1 AND o.buyer_id = $2"))
            .bind(order_id)
            .bind(buyer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_detail(&r)))
    }

    async fn order_for_seller(
        &self,
        order_id: Uuid,
        seller_id: Uuid,
    ) -> anyhow::Result<Option<OrderDetail>> {
        let row = sqlx::query(&format!("{DETAIL_SQL} WHERE o.id = $1 AND pr.seller_id = $2"))
            .bind(order_id)
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_detail(&r)))
    }

    async fn list_for_buyer(&self, buyer_id: Uuid) -> anyhow::Result<Vec<OrderDetail>> {
        let rows = sqlx::query(&format!(
            "{DETAIL_SQL} WHERE o.buyer_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_detail).collect())
    }

    async fn list_for_seller(&self, seller_id: Uuid) -> anyhow::Result<Vec<OrderDetail>> {
        let rows = sqlx::query(&format!(
            "{DETAIL_SQL} WHERE pr.seller_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_detail).collect())
    }

    async fn update_delivery(
        &self,
        order_id: Uuid,
        seller_id: Uuid,
        status: &str,
    ) -> anyhow::Result<Option<OrderRow>> {
        let row = sqlx::query(
            r#"UPDATE orders o
               SET delivery_status = $3,
                   delivered_at = CASE WHEN $3 = 'delivered' THEN now() ELSE o.delivered_at END
               FROM products pr
               WHERE o.id = $1 AND pr.id = o.product_id AND pr.seller_id = $2
               RETURNING o.id, o.buyer_id, o.product_id, o.payment_id, o.quantity,
                         o.total_cents, o.delivery_status, o.delivery_address, o.phone_number,
                         o.mpesa_receipt_number, o.created_at, o.delivered_at"#,
        )
        .bind(order_id)
        .bind(seller_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_order(&r)))
    }
}
