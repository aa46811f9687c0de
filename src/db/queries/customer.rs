//! Customer, property, unit and complaint-type queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    ComplaintType, CreateComplaintTypeRequest, CreateCustomerRequest, CreatePropertyRequest,
    CreateUnitRequest, Customer, Property, Unit,
};

pub async fn create_customer(
    pool: &PgPool,
    request: CreateCustomerRequest,
) -> WorkerResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (full_name, email, phone)
        VALUES ($1, $2, $3)
        RETURNING id, full_name, email, phone, is_active, created_at, updated_at
        "#,
    )
    .bind(&request.full_name)
    .bind(&request.email)
    .bind(&request.phone)
    .fetch_one(pool)
    .await?;

    Ok(customer)
}

pub async fn get_customer(pool: &PgPool, id: Uuid) -> WorkerResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, full_name, email, phone, is_active, created_at, updated_at
        FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

pub async fn create_property(
    pool: &PgPool,
    request: CreatePropertyRequest,
) -> WorkerResult<Property> {
    let property = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties (customer_id, area_id, address)
        VALUES ($1, $2, $3)
        RETURNING id, customer_id, area_id, address, is_active, created_at, updated_at
        "#,
    )
    .bind(request.customer_id)
    .bind(request.area_id)
    .bind(&request.address)
    .fetch_one(pool)
    .await?;

    Ok(property)
}

pub async fn get_property(pool: &PgPool, id: Uuid) -> WorkerResult<Option<Property>> {
    let property = sqlx::query_as::<_, Property>(
        r#"
        SELECT id, customer_id, area_id, address, is_active, created_at, updated_at
        FROM properties
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(property)
}

pub async fn create_unit(pool: &PgPool, request: CreateUnitRequest) -> WorkerResult<Unit> {
    let duplicate: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM units WHERE building = $1 AND unit_no = $2")
            .bind(&request.building)
            .bind(&request.unit_no)
            .fetch_optional(pool)
            .await?;
    if duplicate.is_some() {
        return Err(WorkerError::conflict(format!(
            "unit {} in {} already registered",
            request.unit_no, request.building
        )));
    }

    let unit = sqlx::query_as::<_, Unit>(
        r#"
        INSERT INTO units (customer_id, area_id, building, unit_no)
        VALUES ($1, $2, $3, $4)
        RETURNING id, customer_id, area_id, building, unit_no, is_active, created_at, updated_at
        "#,
    )
    .bind(request.customer_id)
    .bind(request.area_id)
    .bind(&request.building)
    .bind(&request.unit_no)
    .fetch_one(pool)
    .await?;

    Ok(unit)
}

pub async fn get_unit(pool: &PgPool, id: Uuid) -> WorkerResult<Option<Unit>> {
    let unit = sqlx::query_as::<_, Unit>(
        r#"
        SELECT id, customer_id, area_id, building, unit_no, is_active, created_at, updated_at
        FROM units
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(unit)
}

pub async fn create_complaint_type(
    pool: &PgPool,
    request: CreateComplaintTypeRequest,
) -> WorkerResult<ComplaintType> {
    let complaint_type = sqlx::query_as::<_, ComplaintType>(
        r#"
        INSERT INTO complaint_types (name, department_id)
        VALUES ($1, $2)
        RETURNING id, name, department_id, is_active, created_at
        "#,
    )
    .bind(&request.name)
    .bind(request.department_id)
    .fetch_one(pool)
    .await?;

    Ok(complaint_type)
}

pub async fn get_complaint_type(pool: &PgPool, id: Uuid) -> WorkerResult<Option<ComplaintType>> {
    let complaint_type = sqlx::query_as::<_, ComplaintType>(
        r#"
        SELECT id, name, department_id, is_active, created_at
        FROM complaint_types
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(complaint_type)
}

pub async fn list_complaint_types(pool: &PgPool) -> WorkerResult<Vec<ComplaintType>> {
    let complaint_types = sqlx::query_as::<_, ComplaintType>(
        r#"
        SELECT id, name, department_id, is_active, created_at
        FROM complaint_types
        WHERE is_active = TRUE
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(complaint_types)
}
