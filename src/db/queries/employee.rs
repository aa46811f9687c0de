//! Department and employee queries

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};
use crate::types::{
    CreateDepartmentRequest, CreateEmployeeRequest, Department, Employee, ListEmployeesRequest,
    UpdateEmployeeRequest,
};

pub async fn create_department(
    pool: &PgPool,
    request: CreateDepartmentRequest,
) -> WorkerResult<Department> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM departments WHERE name = $1")
            .bind(&request.name)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(WorkerError::conflict(format!(
            "department '{}' already exists",
            request.name
        )));
    }

    let department = sqlx::query_as::<_, Department>(
        r#"
        INSERT INTO departments (name)
        VALUES ($1)
        RETURNING id, name, is_active, created_at, updated_at
        "#,
    )
    .bind(&request.name)
    .fetch_one(pool)
    .await?;

    Ok(department)
}

pub async fn list_departments(pool: &PgPool) -> WorkerResult<Vec<Department>> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name, is_active, created_at, updated_at FROM departments ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(departments)
}

pub async fn create_employee(
    pool: &PgPool,
    request: CreateEmployeeRequest,
) -> WorkerResult<Employee> {
    if let Some(department_id) = request.department_id {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM departments WHERE id = $1")
                .bind(department_id)
                .fetch_optional(pool)
                .await?;
        if exists.is_none() {
            return Err(WorkerError::not_found("department not found"));
        }
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees (full_name, email, phone, department_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, full_name, email, phone, department_id, is_active, created_at, updated_at
        "#,
    )
    .bind(&request.full_name)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(request.department_id)
    .fetch_one(pool)
    .await?;

    Ok(employee)
}

pub async fn get_employee(pool: &PgPool, id: Uuid) -> WorkerResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, full_name, email, phone, department_id, is_active, created_at, updated_at
        FROM employees
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(employee)
}

/// Fetch an employee that must exist and be active.
pub async fn get_active_employee(pool: &PgPool, id: Uuid) -> WorkerResult<Employee> {
    get_employee(pool, id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| WorkerError::not_found(format!("active employee {id} not found")))
}

pub async fn list_employees(
    pool: &PgPool,
    request: ListEmployeesRequest,
) -> WorkerResult<Vec<Employee>> {
    let active_only = request.active_only.unwrap_or(true);

    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, full_name, email, phone, department_id, is_active, created_at, updated_at
        FROM employees
        WHERE ($1 = FALSE OR is_active = TRUE)
          AND ($2::uuid IS NULL OR department_id = $2)
        ORDER BY full_name ASC
        "#,
    )
    .bind(active_only)
    .bind(request.department_id)
    .fetch_all(pool)
    .await?;

    Ok(employees)
}

pub async fn update_employee(
    pool: &PgPool,
    request: UpdateEmployeeRequest,
) -> WorkerResult<Employee> {
    let existing = get_employee(pool, request.id)
        .await?
        .ok_or_else(|| WorkerError::not_found(format!("employee {} not found", request.id)))?;

    let full_name = request.full_name.unwrap_or(existing.full_name);
    let phone = request.phone.or(existing.phone);
    let department_id = request.department_id.or(existing.department_id);
    let is_active = request.is_active.unwrap_or(existing.is_active);

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees
        SET full_name = $1, phone = $2, department_id = $3, is_active = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING id, full_name, email, phone, department_id, is_active, created_at, updated_at
        "#,
    )
    .bind(&full_name)
    .bind(&phone)
    .bind(department_id)
    .bind(is_active)
    .bind(request.id)
    .fetch_one(pool)
    .await?;

    Ok(employee)
}
