use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderDraft, OrderItem, OrderStatus};
use crate::domain::payment::Payment;
use crate::domain::ports::OrderRepository;
use crate::domain::settlement::Settlement;
use crate::schema::{order_items, orders, payments, products};

use super::models::{
    NewOrderItemRow, NewOrderRow, NewPaymentRow, OrderItemRow, OrderRow, PaymentRow, ProductRow,
};
use super::store::DieselStore;

impl OrderRepository for DieselStore {
    fn create(&self, draft: &OrderDraft) -> Result<Order, DomainError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let order_id = Uuid::new_v4();
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    customer_id: draft.customer().id,
                    total_amount: draft.total_amount(),
                    status: OrderStatus::Created.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its items; they never exist without the order row
            let new_items = draft
                .items()
                .iter()
                .enumerate()
                .map(|(line_no, item)| {
                    Ok(NewOrderItemRow {
                        id: Uuid::new_v4(),
                        order_id,
                        line_no: i32::try_from(line_no).map_err(|_| {
                            DomainError::BadParameter("too many order items".to_string())
                        })?,
                        product_id: item.product_id,
                        product_name: item.name.clone(),
                        product_price: item.price,
                        quantity: item.quantity,
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?;
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            Ok(Order {
                id: row.id,
                customer_id: row.customer_id,
                total_amount: row.total_amount,
                status: OrderStatus::Created,
                items: draft.items().to_vec(),
                created_at: row.created_at,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.conn()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .order(order_items::line_no.asc())
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;

        Ok(Some(Order {
            id: order.id,
            customer_id: order.customer_id,
            total_amount: order.total_amount,
            status: order.status.parse()?,
            items: items.into_iter().map(OrderItem::from).collect(),
            created_at: order.created_at,
        }))
    }

    fn settle(&self, settlement: &Settlement) -> Result<Payment, DomainError> {
        let mut conn = self.conn()?;
        let order_id = settlement.order_id;

        conn.transaction::<_, DomainError, _>(|conn| {
            let now = Utc::now();

            // 1. Stock, one version-checked decrement per item
            for dec in &settlement.stock_decrements {
                let row = products::table
                    .find(dec.product_id)
                    .select(ProductRow::as_select())
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| DomainError::ProductNotFound(vec![dec.product_id]))?;

                let mut product = Product::from(row);
                let read_version = product.version;
                product.decrease_stock(dec.quantity)?;

                let updated = diesel::update(
                    products::table
                        .filter(products::id.eq(product.id))
                        .filter(products::version.eq(read_version)),
                )
                .set((
                    products::stock.eq(product.stock),
                    products::version.eq(read_version + 1),
                    products::updated_at.eq(now),
                ))
                .execute(conn)?;
                if updated != 1 {
                    return Err(DomainError::Conflict(format!(
                        "product {} was modified concurrently",
                        product.id
                    )));
                }
            }

            // 2. The single CREATED -> terminal transition
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::status.eq(OrderStatus::Created.as_str())),
            )
            .set((
                orders::status.eq(settlement.status.as_str()),
                orders::total_amount.eq(settlement.total_amount),
                orders::updated_at.eq(now),
            ))
            .execute(conn)?;
            if updated != 1 {
                let exists: i64 = orders::table
                    .filter(orders::id.eq(order_id))
                    .count()
                    .get_result(conn)?;
                return Err(if exists == 0 {
                    DomainError::OrderNotFound(order_id)
                } else {
                    DomainError::Conflict(format!("order {} was already finalized", order_id))
                });
            }

            // 3. A failed order keeps no items
            if settlement.clear_items {
                diesel::delete(order_items::table.filter(order_items::order_id.eq(order_id)))
                    .execute(conn)?;
            }

            // 4. Payment record, mirroring the gateway verbatim
            let row = diesel::insert_into(payments::table)
                .values(&NewPaymentRow {
                    id: Uuid::new_v4(),
                    order_id,
                    transaction_id: settlement.payment.transaction_id.clone(),
                    status: settlement.payment.status.as_str().to_string(),
                    message: settlement.payment.message.clone(),
                })
                .returning(PaymentRow::as_returning())
                .get_result(conn)?;

            Payment::try_from(row)
        })
    }

    fn find_payment(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError> {
        let mut conn = self.conn()?;

        let row = payments::table
            .filter(payments::order_id.eq(order_id))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Payment::try_from).transpose()
    }
}
