use actix_web::{get, post, web, HttpResponse, Responder};
use log::{error, info, warn};

use crate::server::aggregation::paging::{list_page, PageRequest};
use crate::server::controller::error::CustomError;
use crate::server::controller::{decode, fetch, insert};
use crate::server::database::store::{DocumentStore, Filter, Store};
use crate::server::model::user::{
    GetUsersResponse, LoginRequest, SignUpRequest, User, UserView,
};
use crate::server::model::{CreatedResponse, Entity, PageParams};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::password::{hash_password, verify_password};
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::validation::{
    required, required_text, validate_email, validate_password, validate_text, MAX_NAME_LEN,
    MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
};

/// Email first, then phone. Two lookups, not atomic with the insert that follows.
async fn ensure_unused(store: &Store, email: &str, phone: &str) -> Result<(), CustomError> {
    for (field, value) in [("email", email), ("phone", phone)] {
        if store
            .find_one(User::COLLECTION, &Filter::eq(field, value))
            .await?
            .is_some()
        {
            warn!("signup rejected, {} already registered", field);
            return Err(CustomError::Conflict);
        }
    }
    Ok(())
}

#[get("/users")]
pub(crate) async fn get_users(
    query: web::Query<PageParams>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let request = PageRequest::from(&query.into_inner());
    let page = list_page::<_, User>(data.store(), User::COLLECTION, request).await?;
    Ok(web::Json(GetUsersResponse {
        total_count: page.total_count,
        user_items: page.items.into_iter().map(UserView::from).collect(),
    }))
}

#[get("/users/{user_id}")]
pub(crate) async fn get_user(
    user_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let user: User = fetch(data.store(), &user_id).await?;
    Ok(web::Json(UserView::from(user)))
}

#[post("/users/signup")]
pub(crate) async fn sign_up(
    req: web::Json<SignUpRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let first_name = required_text(req.first_name, "first_name", MAX_NAME_LEN)?;
    let last_name = required_text(req.last_name, "last_name", MAX_NAME_LEN)?;
    let email = required(req.email, "email")?;
    validate_email(&email)?;
    let phone = required_text(req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    let password = required(req.password, "password")?;
    validate_password(&password)?;
    if let Some(avatar) = &req.avatar {
        validate_text(avatar, "avatar", MAX_URL_LEN)?;
    }

    let store = data.store();
    ensure_unused(store, &email, &phone).await?;

    let password = hash_password(&password).map_err(|e| {
        error!("failed to hash password, {}", e);
        CustomError::Internal
    })?;
    let now = get_utc_now();
    let user = User {
        user_id: new_object_id(),
        first_name,
        last_name,
        email,
        phone,
        password,
        avatar: req.avatar,
        token: None,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(store, &user).await?;
    info!("user {} signed up", user.user_id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: user.user_id,
    }))
}

#[post("/users/login")]
pub(crate) async fn login(
    req: web::Json<LoginRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;

    let rejected = || CustomError::BadRequest {
        detail: "incorrect email or password".to_string(),
    };
    let Some(doc) = data
        .store()
        .find_one(User::COLLECTION, &Filter::eq("email", email.as_str()))
        .await?
    else {
        warn!("login with unknown email");
        return Err(rejected());
    };
    let user: User = decode(doc)?;
    if !verify_password(&password, &user.password) {
        warn!("login with wrong password for user {}", user.user_id);
        return Err(rejected());
    }
    Ok(web::Json(UserView::from(user)))
}
