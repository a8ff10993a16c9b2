use actix_web::{web, HttpResponse};
use futures_util::FutureExt;

use crate::core::{AppError, EntityId, Repository};
use crate::modules::customers::models::{Customer, CustomerRequest};
use crate::modules::customers::specifications::{customer_by_email, customer_with_orders};
use crate::modules::orders::models::Order;
use crate::modules::orders::specifications::orders_of_customer;
use crate::persistence::UnitOfWorkFactory;

/// List customers
/// GET /customers
pub async fn list_customers(factory: web::Data<UnitOfWorkFactory>) -> Result<HttpResponse, AppError> {
    let customers = factory
        .scope(|uow| {
            async move { Ok::<_, AppError>(uow.repository::<Customer>()?.get_all().await?) }.boxed()
        })
        .await?;

    Ok(HttpResponse::Ok().json(customers))
}

/// Get customer by ID with orders and their lines
/// GET /customers/{id}
pub async fn get_customer(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    let customer = factory
        .scope(|uow| {
            async move {
                let customer = uow
                    .repository::<Customer>()?
                    .get_entity_with_spec(&customer_with_orders(customer_id))
                    .await?;
                Ok::<_, AppError>(customer)
            }
            .boxed()
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {}", customer_id)))?;

    Ok(HttpResponse::Ok().json(customer))
}

/// Create a customer
/// POST /customers
pub async fn create_customer(
    factory: web::Data<UnitOfWorkFactory>,
    request: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let customer = Customer::new(request.name.trim(), request.email);
    customer.validate()?;

    let created = factory
        .scope(|uow| {
            async move {
                let repository = uow.repository::<Customer>()?;
                if repository
                    .get_entity_with_spec(&customer_by_email(customer.email.as_str()))
                    .await?
                    .is_some()
                {
                    return Err(AppError::validation(format!(
                        "A customer with email {} already exists",
                        customer.email
                    )));
                }

                let staged = repository.add(customer).await?;
                uow.complete().await?;
                Ok::<_, AppError>(staged.into_inner())
            }
            .boxed()
        })
        .await?;

    tracing::info!(customer_id = ?created.id, "Customer created");
    Ok(HttpResponse::Created().json(created))
}

/// Replace a customer's name and email
/// PUT /customers/{id}
pub async fn update_customer(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
    request: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let request = request.into_inner();

    let updated = factory
        .scope(|uow| {
            async move {
                let repository = uow.repository::<Customer>()?;
                let mut customer = repository
                    .get_by_id(customer_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Customer {}", customer_id)))?;

                customer.name = request.name.trim().to_string();
                customer.set_email(request.email);
                customer.validate()?;

                // Uniqueness of the new email is enforced by the store on commit
                repository.update(&customer)?;
                uow.complete().await?;
                Ok::<_, AppError>(customer)
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a customer without orders
/// DELETE /customers/{id}
pub async fn delete_customer(
    factory: web::Data<UnitOfWorkFactory>,
    path: web::Path<EntityId>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    factory
        .scope(|uow| {
            async move {
                let repository = uow.repository::<Customer>()?;
                let customer = repository
                    .get_by_id(customer_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Customer {}", customer_id)))?;

                let orders = uow
                    .repository::<Order>()?
                    .get_all_with_spec(&orders_of_customer(customer_id))
                    .await?;
                if !orders.is_empty() {
                    return Err(AppError::validation(format!(
                        "Customer {} still has {} order(s)",
                        customer_id,
                        orders.len()
                    )));
                }

                repository.delete(&customer)?;
                uow.complete().await?;
                Ok::<_, AppError>(())
            }
            .boxed()
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list_customers))
            .route("", web::post().to(create_customer))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer))
            .route("/{id}", web::delete().to(delete_customer)),
    );
}
