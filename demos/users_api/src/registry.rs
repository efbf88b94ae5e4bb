use crate::handlers::users;
use crate::store::UserStore;
use routecontract::router::RouteGroup;
use routecontract::server::{RawRequest, ResponseWriter};
use routecontract::{ApiKeyLocation, AuthScheme, ContractError, FileUpload, Handler, RouteParameters};
use routecontract::{Context, RouterBuilder};
use std::sync::Arc;

fn api_key() -> AuthScheme {
    AuthScheme::api_key("API Key", ApiKeyLocation::Header, "X-API-Key")
        .with_description("API key authentication")
}

fn secured(summary: &str) -> RouteParameters {
    RouteParameters::summary(summary).with_auth(api_key())
}

/// Mount every `/users` route on `builder`.
pub fn register_all(builder: &mut RouterBuilder, store: Arc<UserStore>) -> Result<(), ContractError> {
    let mut group = builder.group("/users", "Users");
    register_routes(&mut group, store)
}

pub fn register_routes(group: &mut RouteGroup<'_>, store: Arc<UserStore>) -> Result<(), ContractError> {
    let s = Arc::clone(&store);
    group.get(
        "/get/:id",
        secured("Get user"),
        Handler::record(move |ctx: &Context, req: users::GetUserReq| users::get_user(&s, ctx, req)),
    )?;

    let s = Arc::clone(&store);
    group.get(
        "/get/:id/avatar",
        secured("Get user avatar"),
        Handler::error_only_with_writer(
            move |ctx: &Context,
                  req: users::GetUserAvatarReq,
                  raw: &dyn RawRequest,
                  out: &mut dyn ResponseWriter| {
                users::get_user_avatar(&s, ctx, req, raw, out)
            },
        ),
    )?;

    let s = Arc::clone(&store);
    group.get(
        "/list",
        RouteParameters::summary("List users"),
        Handler::record(move |ctx: &Context, req: users::ListUsersReq| users::list_users(&s, ctx, req)),
    )?;

    let s = Arc::clone(&store);
    group.post(
        "/create",
        secured("Create user").with_file_upload(FileUpload::single("custom_file")),
        Handler::record_with_request(
            move |ctx: &Context, req: users::CreateUserReq, raw: &dyn RawRequest| {
                users::create_user(&s, ctx, req, raw)
            },
        ),
    )?;

    let s = Arc::clone(&store);
    group.post(
        "/update/:id",
        secured("Update user"),
        Handler::record(move |ctx: &Context, req: users::UpdateUserReq| users::update_user(&s, ctx, req)),
    )?;

    let s = Arc::clone(&store);
    group.post(
        "/update/:id/avatar",
        secured("Update user avatar"),
        Handler::record_with_request(
            move |ctx: &Context, req: users::UpdateUserAvatarReq, raw: &dyn RawRequest| {
                users::update_user_avatar(&s, ctx, req, raw)
            },
        ),
    )?;

    group.delete(
        "/delete/:id",
        secured("Delete user"),
        Handler::record(move |ctx: &Context, req: users::DeleteUserReq| {
            users::delete_user(&store, ctx, req)
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use routecontract::{BufferedResponse, ContractConfig, FilePart, HttpRequest, MultipartForm, Router};
    use serde_json::{json, Value};

    fn router() -> Router {
        let mut builder = RouterBuilder::new(ContractConfig::default());
        register_all(&mut builder, Arc::new(UserStore::new())).unwrap();
        builder.seal()
    }

    fn call(router: &Router, request: HttpRequest) -> BufferedResponse {
        let mut out = BufferedResponse::new();
        router.dispatch(&Context::new(), &request, &mut out);
        out
    }

    fn create(router: &Router, login: &str) -> Value {
        let form = MultipartForm::new()
            .with_value("request", json!({"login": login, "name": "Ann", "email": "ann@example.com"}).to_string())
            .with_file("avatar", FilePart::new("a.png", vec![7, 7]))
            .with_file("custom_file", FilePart::new("c.txt", "c"));
        let res = call(router, HttpRequest::new(Method::POST, "/users/create").with_form(form));
        assert_eq!(res.status, 200);
        res.json().unwrap()
    }

    #[test]
    fn test_create_then_get_and_avatar() {
        let router = router();
        let created = create(&router, "ann");
        assert_eq!(created["docs_count"], 0);
        assert_eq!(created["additional_found"], true);
        let id = created["id"].as_str().unwrap().to_string();

        let res = call(&router, HttpRequest::new(Method::GET, &format!("/users/get/{id}?public=false")));
        assert_eq!(
            res.json().unwrap(),
            json!({"login": "ann", "name": "Ann", "email": "ann@example.com"})
        );
        let res = call(&router, HttpRequest::new(Method::GET, &format!("/users/get/{id}?public=1")));
        assert_eq!(res.json().unwrap()["email"], "");

        let res = call(&router, HttpRequest::new(Method::GET, &format!("/users/get/{id}/avatar")));
        assert_eq!(res.body, vec![7, 7]);
        assert_eq!(res.get_header("content-type"), Some("application/octet-stream"));
    }

    #[test]
    fn test_missing_public_flag_is_rejected() {
        let router = router();
        let id = create(&router, "bob")["id"].as_str().unwrap().to_string();
        let res = call(&router, HttpRequest::new(Method::GET, &format!("/users/get/{id}")));
        assert_eq!(res.status, 500);
        assert_eq!(res.json().unwrap()["error"], "invalid value for parameter public");
    }

    #[test]
    fn test_update_list_delete() {
        let router = router();
        let id = create(&router, "cy")["id"].as_str().unwrap().to_string();
        create(&router, "di");

        let res = call(
            &router,
            HttpRequest::new(Method::POST, &format!("/users/update/{id}")).with_json(&json!({"name": "Cyrus"})),
        );
        assert_eq!(res.json().unwrap()["name"], "Cyrus");

        let res = call(&router, HttpRequest::new(Method::GET, "/users/list?offset=1&limit=1"));
        assert_eq!(res.json().unwrap(), json!({"users": [{"login": "di", "name": "Ann"}]}));

        let res = call(&router, HttpRequest::new(Method::DELETE, &format!("/users/delete/{id}")));
        assert_eq!(res.json().unwrap(), json!({}));
        let res = call(&router, HttpRequest::new(Method::DELETE, &format!("/users/delete/{id}")));
        assert_eq!(res.status, 500);
        assert_eq!(
            res.json().unwrap()["error"],
            "Status: 400, Message: \"user not found\""
        );
    }

    #[test]
    fn test_avatar_upload_with_force_flag() {
        let router = router();
        let id = create(&router, "ed")["id"].as_str().unwrap().to_string();
        let form = MultipartForm::new().with_file("avatar", FilePart::new("new.png", vec![1]));
        let res = call(
            &router,
            HttpRequest::new(Method::POST, &format!("/users/update/{id}/avatar?force=true")).with_form(form),
        );
        assert_eq!(res.json().unwrap(), json!({"forced": true}));
        let res = call(&router, HttpRequest::new(Method::GET, &format!("/users/get/{id}/avatar")));
        assert_eq!(res.body, vec![1]);
    }

    #[test]
    fn test_document_covers_every_route() {
        let doc = router().emit_document();
        let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "/users/create",
                "/users/delete/{id}",
                "/users/get/{id}",
                "/users/get/{id}/avatar",
                "/users/list",
                "/users/update/{id}",
                "/users/update/{id}/avatar",
            ]
        );
        let create = doc.operation("/users/create", &Method::POST).unwrap();
        assert_eq!(
            create.parameter_names(),
            vec!["custom_file", "avatar", "docs", "request"]
        );
        let avatar = doc.operation("/users/get/{id}/avatar", &Method::GET).unwrap();
        assert!(avatar.responses.is_empty());
        assert_eq!(doc.security_definitions.len(), 1);
    }
}
