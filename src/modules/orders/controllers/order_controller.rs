//! Order endpoints
//!
//! Every handler runs inside one scoped unit of work: reads and staged
//! writes share a session and are committed together by `complete`.

use actix_web::{web, HttpResponse};
use futures_util::FutureExt;
use serde::Deserialize;

use crate::core::{AppError, EntityId, Repository, Specification};
use crate::modules::customers::models::Customer;
use crate::modules::orders::models::{
    CreateOrderLineRequest, CreateOrderRequest, Order, OrderLine, OrderStatus, UpdateOrderRequest,
};
use crate::modules::orders::specifications::{
    customer_include, lines_include, lines_of_order, order_details, orders_with_status,
};
use crate::persistence::UnitOfWorkFactory;

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    /// Comma separated relations to load: `customer`, `lines`
    pub include: Option<String>,
}

impl ListOrdersQuery {
    fn specification(&self) -> Result<Specification<Order>, AppError> {
        let mut spec = match self.status {
            Some(status) => orders_with_status(status),
            None => Specification::new(),
        };

        let relations = self.include.as_deref().unwrap_or_default();
        for relation in relations.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            spec = match relation {
                "customer" => spec.add_include(customer_include()),
                "lines" => spec.add_include(lines_include()),
                other => {
                    return Err(AppError::validation(format!("Unknown relation: {}", other)));
                }
            };
        }

        Ok(spec)
    }
}

/// List orders
/// GET /orders
pub async fn list_orders(
    factory: web::Data<UnitOfWorkFactory>,
    query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
    let spec = query.specification()?;

    let orders = factory
        .scope(|uow| {
            async move {
                let orders = uow.repository::<Order>()?.get_all_with_spec(&spec).await?;
                Ok::<_, AppError>(orders)
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::Ok().json(orders))
}

/// Get order by ID with customer and lines
/// GET /orders/{id}
pub async fn get_order(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = factory
        .scope(|uow| {
            async move {
                let order = uow
                    .repository::<Order>()?
                    .get_entity_with_spec(&order_details(order_id))
                    .await?;
                Ok::<_, AppError>(order)
            }
            .boxed()
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

    Ok(HttpResponse::Ok().json(order))
}

/// Create a new order
/// POST /orders
pub async fn create_order(
    factory: web::Data<UnitOfWorkFactory>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let order = Order::new(request.customer_id, request.total).with_status(request.status);
    order.validate()?;

    let created = factory
        .scope(|uow| {
            async move {
                if uow.repository::<Customer>()?.get_by_id(order.customer_id).await?.is_none() {
                    return Err(AppError::validation(format!(
                        "Customer {} does not exist",
                        order.customer_id
                    )));
                }

                let staged = uow.repository::<Order>()?.add(order).await?;
                uow.complete().await?;
                Ok::<_, AppError>(staged.into_inner())
            }
            .boxed()
        })
        .await?;

    tracing::info!(order_id = ?created.id, customer_id = created.customer_id, "Order created");
    Ok(HttpResponse::Created().json(created))
}

/// Replace an order's status and total
/// PUT /orders/{id}
pub async fn update_order(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let request = request.into_inner();

    let updated = factory
        .scope(|uow| {
            async move {
                let repository = uow.repository::<Order>()?;
                let mut order = repository
                    .get_by_id(order_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

                if !order.is_editable() {
                    return Err(AppError::validation(format!(
                        "Order {} is {} and can no longer be changed",
                        order_id, order.status
                    )));
                }

                order.status = request.status;
                order.total = request.total;
                order.validate()?;

                repository.update(&order)?;
                uow.complete().await?;
                Ok::<_, AppError>(order)
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete an order together with its lines
/// DELETE /orders/{id}
pub async fn delete_order(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let affected = factory
        .scope(|uow| {
            async move {
                let order = uow
                    .repository::<Order>()?
                    .get_entity_with_spec(&Specification::with_complex_include(
                        move |order: &Order| order.id == Some(order_id),
                        |query| query.include(lines_include()),
                    ))
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

                uow.repository::<OrderLine>()?.remove_range(&order.lines)?;
                uow.repository::<Order>()?.delete(&order)?;
                Ok::<_, AppError>(uow.complete().await?)
            }
            .boxed()
        })
        .await?;

    tracing::info!(order_id, affected, "Order deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// List the lines of an order
/// GET /orders/{id}/lines
pub async fn list_order_lines(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let lines = factory
        .scope(|uow| {
            async move {
                if uow.repository::<Order>()?.get_by_id(order_id).await?.is_none() {
                    return Err(AppError::not_found(format!("Order {}", order_id)));
                }
                let lines = uow
                    .repository::<OrderLine>()?
                    .get_all_with_spec(&lines_of_order(order_id))
                    .await?;
                Ok::<_, AppError>(lines)
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::Ok().json(lines))
}

/// Add a line to an order and add its subtotal to the order total
/// POST /orders/{id}/lines
pub async fn add_order_line(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
    request: web::Json<CreateOrderLineRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let request = request.into_inner();
    let line = OrderLine::new(order_id, request.product, request.quantity, request.unit_price);
    line.validate()?;

    let created = factory
        .scope(|uow| {
            async move {
                let orders = uow.repository::<Order>()?;
                let mut order = orders
                    .get_by_id(order_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

                if !order.is_editable() {
                    return Err(AppError::validation(format!(
                        "Order {} is {} and can no longer be changed",
                        order_id, order.status
                    )));
                }

                order.total += line.subtotal();
                order.validate()?;

                // Line insert and total update commit together
                let staged = uow.repository::<OrderLine>()?.add(line).await?;
                orders.update(&order)?;
                uow.complete().await?;
                Ok::<_, AppError>(staged.into_inner())
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Configure order routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order))
            .route("/{id}", web::delete().to(delete_order))
            .route("/{id}/lines", web::get().to(list_order_lines))
            .route("/{id}/lines", web::post().to(add_order_line)),
    );
}
