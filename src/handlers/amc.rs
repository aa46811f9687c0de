//! AMC contract handlers

use anyhow::Result;
use async_nats::{Client, Subscriber};

use crate::db::queries;
use crate::error::WorkerError;
use crate::handlers::{serve, HandlerContext};
use crate::services::amc_generator;
use crate::types::{
    ActivateAmcContractRequest, AmcContractDetail, AmcGenerationResult, AmcStatus,
    CancelAmcContractRequest, CreateAmcContractRequest, GenerateAmcSchedulesRequest,
    GetAmcContractRequest, ListAmcContractsRequest, ListResponse, RecordAmcPaymentRequest,
};

pub async fn handle_contract_create(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.contract.create",
        "amc:write",
        |ctx, _auth, payload: CreateAmcContractRequest| async move {
            queries::amc::create_contract(&ctx.pool, payload).await
        },
    )
    .await
}

pub async fn handle_contract_get(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.contract.get",
        "amc:read",
        |ctx, _auth, payload: GetAmcContractRequest| async move {
            let contract = queries::amc::get_contract(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    WorkerError::not_found(format!("contract {} not found", payload.id))
                })?;

            let properties = queries::amc::list_properties(&ctx.pool, contract.id).await?;
            let services = queries::amc::list_services(&ctx.pool, contract.id).await?;
            let schedules = queries::amc::list_schedules(&ctx.pool, contract.id).await?;
            let payments = queries::amc::list_payments(&ctx.pool, contract.id).await?;

            Ok(AmcContractDetail {
                contract,
                properties,
                services,
                schedules,
                payments,
            })
        },
    )
    .await
}

pub async fn handle_contract_list(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.contract.list",
        "amc:read",
        |ctx, _auth, payload: ListAmcContractsRequest| async move {
            let items = queries::amc::list_contracts(&ctx.pool, payload).await?;
            Ok(ListResponse::new(items))
        },
    )
    .await
}

pub async fn handle_contract_activate(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.contract.activate",
        "amc:write",
        |ctx, _auth, payload: ActivateAmcContractRequest| async move {
            amc_generator::activate_contract(&ctx.pool, payload.id).await
        },
    )
    .await
}

pub async fn handle_contract_cancel(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.contract.cancel",
        "amc:write",
        |ctx, _auth, payload: CancelAmcContractRequest| async move {
            let contract = queries::amc::get_contract(&ctx.pool, payload.id)
                .await?
                .ok_or_else(|| {
                    WorkerError::not_found(format!("contract {} not found", payload.id))
                })?;

            // Drafts are deleted outright; anything further along is kept
            // and marked cancelled.
            match contract.status {
                AmcStatus::Draft => {
                    queries::amc::delete_draft(&ctx.pool, contract.id).await?;
                    Ok(serde_json::json!({ "deleted": true }))
                }
                AmcStatus::Active => {
                    queries::amc::set_status(&ctx.pool, contract.id, AmcStatus::Cancelled).await?;
                    Ok(serde_json::json!({ "deleted": false, "status": "cancelled" }))
                }
                other => Err(WorkerError::validation(format!(
                    "cannot cancel a {} contract",
                    other.as_str()
                ))),
            }
        },
    )
    .await
}

pub async fn handle_schedule_generate(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.schedule.generate",
        "amc:write",
        |ctx, _auth, payload: GenerateAmcSchedulesRequest| async move {
            let visits_created =
                amc_generator::generate_schedules(&ctx.pool, payload.contract_id).await?;
            Ok(AmcGenerationResult {
                contract_id: payload.contract_id,
                visits_created,
                installments_created: 0,
            })
        },
    )
    .await
}

pub async fn handle_payment_generate(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.payment.generate",
        "amc:write",
        |ctx, _auth, payload: GenerateAmcSchedulesRequest| async move {
            let installments_created =
                amc_generator::generate_payment_schedule(&ctx.pool, payload.contract_id).await?;
            Ok(AmcGenerationResult {
                contract_id: payload.contract_id,
                visits_created: 0,
                installments_created,
            })
        },
    )
    .await
}

pub async fn handle_payment_record(
    client: Client,
    subscriber: Subscriber,
    ctx: HandlerContext,
) -> Result<()> {
    serve(
        client,
        subscriber,
        ctx,
        "orbis.amc.payment.record",
        "amc:write",
        |ctx, _auth, payload: RecordAmcPaymentRequest| async move {
            queries::amc::record_payment(&ctx.pool, payload.payment_id, payload.full).await
        },
    )
    .await
}
