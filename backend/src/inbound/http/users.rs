//! Users API handlers.
//!
//! Each handler validates its input, sends exactly one command through the
//! users client and relays the reply. Nothing is sent when validation fails.
//!
//! ```text
//! POST   /gateway/users        {"name":"Ana","email":"ana@x.com","password":"secret1"}
//! GET    /gateway/users
//! GET    /gateway/users/{id}
//! PATCH  /gateway/users/{id}   {"name":"Ana Maria"}
//! DELETE /gateway/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Email, Error, NewUser, Password, User, UserName, UserPatch, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_user_id, user_validation_error,
};

/// Request body for `POST /gateway/users`.
///
/// Unknown fields are ignored.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ana")]
    pub name: Option<String>,
    #[schema(example = "ana@x.com")]
    pub email: Option<String>,
    #[schema(example = "secret1", min_length = 6)]
    pub password: Option<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let CreateUserRequest {
            name,
            email,
            password,
        } = value;
        let name = name.ok_or_else(|| missing_field_error(FieldName::new("name")))?;
        let email = email.ok_or_else(|| missing_field_error(FieldName::new("email")))?;
        let password =
            password.ok_or_else(|| missing_field_error(FieldName::new("password")))?;
        NewUser::try_from_strings(name, email, password)
            .map_err(|err| user_validation_error(&err))
    }
}

/// Request body for `PATCH /gateway/users/{id}`.
///
/// Absent fields are left unchanged; unknown fields are ignored.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "Ana Maria")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[schema(min_length = 6)]
    pub password: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let validate = |err: UserValidationError| user_validation_error(&err);
        Ok(Self {
            name: value.name.map(UserName::new).transpose().map_err(validate)?,
            email: value.email.map(Email::new).transpose().map_err(validate)?,
            password: value
                .password
                .map(Password::new)
                .transpose()
                .map_err(validate)?,
        })
    }
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/gateway/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 502, description = "Users service unreachable", body = ErrorSchema),
        (status = 504, description = "Users service did not reply", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = NewUser::try_from(payload.into_inner())?;
    let created = state.users.create_user(&user).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List every user, ordered by id.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use usergate::inbound::http::users::list_users;
///
/// let app = App::new().service(web::scope("/gateway").service(list_users));
/// ```
#[utoipa::path(
    get,
    path = "/gateway/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 502, description = "Users service unreachable", body = ErrorSchema),
        (status = 504, description = "Users service did not reply", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.find_all_users().await?;
    Ok(web::Json(users))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/gateway/users/{id}",
    params(("id" = i32, Path, description = "User identifier", minimum = 1)),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users.find_one_user(id).await?;
    Ok(web::Json(user))
}

/// Apply a partial update to a user.
#[utoipa::path(
    patch,
    path = "/gateway/users/{id}",
    params(("id" = i32, Path, description = "User identifier", minimum = 1)),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state.users.update_user(id, patch).await?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/gateway/users/{id}",
    params(("id" = i32, Path, description = "User identifier", minimum = 1)),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.remove_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
