//! Route table and handler wiring of the demo service.

use std::sync::Arc;

use fastdca_config::AppConfig;
use fastdca_core::{Container, GetObjectOr404};
use fastdca_extract::{extract, Path, Query, Valid};
use fastdca_server::{HandlerError, HandlerRegistry, Router, Server};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::deps::{self, Credentials, Goal, LoginStatus};
use crate::model::User;

#[derive(Debug, Deserialize)]
struct ItemPath {
    item_id: i64,
}

#[derive(Debug, Deserialize)]
struct ItemQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct Item {
    item_id: i64,
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainPath {
    num: i64,
}

/// Method, path template and operation ID of every demo route.
pub fn router() -> Router {
    Router::new()
        .route(Method::GET, "/", "readRoot")
        .route(Method::GET, "/items/{item_id}", "readItem")
        .route(Method::GET, "/get-simple-goal", "getSimpleGoal")
        .route(Method::GET, "/get-goal", "getGoal")
        .route(Method::GET, "/signin", "signin")
        .route(Method::GET, "/main/{num}", "getMain")
        .route(Method::GET, "/blog/{id}", "getBlog")
        .route(Method::GET, "/user/{id}", "getUser")
        .route(Method::POST, "/users", "createUser")
}

/// Handlers for every operation in [`router`].
///
/// The catalogs are built here once and shared by every request.
pub fn handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();

    handlers.register("readRoot", |(): ()| async {
        Ok::<_, HandlerError>(json!({"Hello": "World"}))
    });

    handlers.register(
        "readItem",
        |(Path(path), Query(query)): (Path<ItemPath>, Query<ItemQuery>)| async move {
            Ok::<_, HandlerError>(Item {
                item_id: path.item_id,
                q: query.q,
            })
        },
    );

    handlers.register_with("getSimpleGoal", deps::simple_goal(), |goal: Goal| async move {
        Ok::<_, HandlerError>(goal)
    });

    handlers.register_with("getGoal", deps::goal(), |goal: Goal| async move {
        Ok::<_, HandlerError>(goal)
    });

    handlers.register_with("signin", deps::login(), |status: LoginStatus| async move {
        Ok::<_, HandlerError>(status)
    });

    handlers.register_with(
        "getMain",
        (
            extract::<Path<MainPath>>(),
            deps::num_plus(1),
            deps::num_plus(2),
        ),
        |(Path(path), num1, num2): (Path<MainPath>, i128, i128)| async move {
            let total = i128::from(path.num) + num1 + num2;
            Ok::<_, HandlerError>(format!("Pakistan {total}"))
        },
    );

    handlers.register_with(
        "getBlog",
        GetObjectOr404::new(deps::blogs()),
        |blog_name: String| async move { Ok::<_, HandlerError>(blog_name) },
    );

    handlers.register_with(
        "getUser",
        GetObjectOr404::new(deps::users()),
        |user_name: String| async move { Ok::<_, HandlerError>(user_name) },
    );

    handlers.register("createUser", |Valid(user): Valid<User>| async move {
        Ok::<Value, HandlerError>(user.model_dump())
    });

    handlers
}

/// Builds the demo server from `config` without binding a socket.
pub fn app(config: &AppConfig) -> Server {
    let container = Container::new().with(Arc::new(Credentials::from(&config.login)));
    let router = router();

    tracing::debug!(
        routes = router.route_count(),
        service = %config.server.service_name,
        "building demo application"
    );

    Server::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(config.server.shutdown_timeout())
        .request_timeout(config.server.request_timeout())
        .service_name(config.server.service_name.clone())
        .service_version(crate::VERSION)
        .router(router)
        .handlers(handlers())
        .container(container)
        .build()
}
