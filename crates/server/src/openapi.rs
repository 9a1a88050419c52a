use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Changing the email clears its verification.
#[derive(ToSchema)]
pub struct ProfileUpdateRequest { pub name: String, pub email: String }

#[derive(ToSchema)]
pub struct PasswordUpdateRequest { pub current_password: String, pub password: String }

#[derive(ToSchema)]
pub struct DeleteAccountRequest { pub password: String }

#[derive(ToSchema)]
pub struct StoreHoursDoc {
    pub id: Uuid,
    #[schema(example = "2024-07-01")]
    pub date: String,
    #[schema(example = "09:00:00")]
    pub open_time: Option<String>,
    #[schema(example = "17:00:00")]
    pub close_time: Option<String>,
    pub is_closed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Open days need both times with `open_time < close_time`.
#[derive(ToSchema)]
pub struct StoreHoursInputDoc {
    #[schema(example = "2024-07-01")]
    pub date: String,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: Option<bool>,
}

/// Omitted fields keep their stored value; `null` clears a time.
#[derive(ToSchema)]
pub struct StoreHoursPatchDoc {
    pub date: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: Option<bool>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::verify_email,
        crate::routes::auth::resend_verification,
        crate::routes::settings::update_profile,
        crate::routes::settings::delete_account,
        crate::routes::settings::update_password,
        crate::routes::store_hours::list,
        crate::routes::store_hours::create,
        crate::routes::store_hours::get_one,
        crate::routes::store_hours::by_date,
        crate::routes::store_hours::update,
        crate::routes::store_hours::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ProfileUpdateRequest,
            PasswordUpdateRequest,
            DeleteAccountRequest,
            StoreHoursDoc,
            StoreHoursInputDoc,
            StoreHoursPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "settings"),
        (name = "store_hours")
    )
)]
pub struct ApiDoc;
