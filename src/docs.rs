// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,

        // --- Config ---
        handlers::config::get_config,
        handlers::config::update_config,
        handlers::config::list_user_overrides,
        handlers::config::get_user_override,
        handlers::config::upsert_user_override,
        handlers::config::delete_user_override,
        handlers::config::get_effective_config,

        // --- Jam Kerja ---
        handlers::jam_kerja::start,
        handlers::jam_kerja::pause,
        handlers::jam_kerja::resume,
        handlers::jam_kerja::end,
        handlers::jam_kerja::history,
        handlers::jam_kerja::current,
        handlers::jam_kerja::rekap,
        handlers::jam_kerja::my_summary,
        handlers::jam_kerja::owner_summary,

        // --- Gaji ---
        handlers::gaji::create_gaji,
        handlers::gaji::update_gaji,
        handlers::gaji::delete_gaji,
        handlers::gaji::list_gaji,
        handlers::gaji::gaji_summary,
        handlers::gaji::my_gaji,
        handlers::gaji::my_gaji_summary,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::add_payment,
        handlers::customers::list_payments,
        handlers::customers::update_invoice,

        // --- Tuton ---
        handlers::tuton::create_course,
        handlers::tuton::list_courses,
        handlers::tuton::delete_course,
        handlers::tuton::list_items,
        handlers::tuton::init_items,
        handlers::tuton::bulk_status,
        handlers::tuton::bulk_nilai,
        handlers::tuton::update_item,
        handlers::tuton::update_item_status,
        handlers::tuton::update_item_nilai,
        handlers::tuton::list_conflicts,
        handlers::tuton::get_conflict,

        // --- Karil ---
        handlers::karil::list_karil,
        handlers::karil::get_karil,
        handlers::karil::upsert_karil,

        // --- Realtime ---
        handlers::events::stream_events,
    ),
    components(
        schemas(
            common::periods::Periode,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Config ---
            models::config::AppConfig,
            models::config::UserConfigOverride,
            models::config::EffectiveConfig,
            models::config::UpdateAppConfigPayload,
            models::config::UpsertUserOverridePayload,

            // --- Jam Kerja ---
            models::jam_kerja::JamKerjaStatus,
            models::jam_kerja::JamKerja,
            models::jam_kerja::EndSessionResponse,
            models::jam_kerja::RekapResponse,
            models::jam_kerja::JamGaji,
            models::jam_kerja::UserJamSummary,
            models::jam_kerja::OwnerJamSummary,
            models::jam_kerja::SummaryScope,
            models::jam_kerja::StartSessionPayload,

            // --- Gaji ---
            models::gaji::Gaji,
            models::gaji::CreateGajiPayload,
            models::gaji::UpdateGajiPayload,
            models::gaji::GajiSummary,
            models::gaji::OwnerGajiSummary,

            // --- Customers ---
            models::customer::CustomerJenis,
            models::customer::Customer,
            models::customer::CustomerPayment,
            models::customer::PaymentResult,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,
            models::customer::CreateCustomerPaymentPayload,
            models::customer::UpdateInvoicePayload,

            // --- Tuton ---
            models::tuton::TutonItemJenis,
            models::tuton::TutonItemStatus,
            models::tuton::TutonCourse,
            models::tuton::TutonItem,
            models::tuton::TutonItemChange,
            models::tuton::BulkUpdateResult,
            models::tuton::CourseItems,
            models::tuton::ConflictMember,
            models::tuton::ConflictGroup,
            models::tuton::CreateCoursePayload,
            models::tuton::InitItemsPayload,
            models::tuton::UpdateItemPayload,
            models::tuton::UpdateItemStatusPayload,
            models::tuton::UpdateItemNilaiPayload,
            models::tuton::BulkStatusEntry,
            models::tuton::BulkStatusPayload,
            models::tuton::BulkNilaiEntry,
            models::tuton::BulkNilaiPayload,

            // --- Karil ---
            models::karil::KarilDetail,
            models::karil::KarilView,
            models::karil::UpsertKarilPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e cadastro de funcionários"),
        (name = "Users", description = "Dados do usuário logado e equipe"),
        (name = "Config", description = "Gaji por hora e regras de pausa (global e por funcionário)"),
        (name = "Jam Kerja", description = "Ponto: início, pausa, retomada e fim de sessões"),
        (name = "Gaji", description = "Pagamentos de salário e saldo restante"),
        (name = "Customers", description = "Clientes, cobrança e pagamentos"),
        (name = "Tuton", description = "Matkuls e itens (diskusi, absen, tugas)"),
        (name = "Karil", description = "Acompanhamento de karya ilmiah"),
        (name = "Realtime", description = "Eventos ao vivo via SSE")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
