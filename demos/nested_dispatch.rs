//! Example: nested dispatch across namespaces
//!
//! A public `/dashboard` page renders a widget from an internal, non-routeable
//! `/admin` namespace by issuing a nested request. The lifecycle of every
//! request on the chain is printed from the event stream.

use std::sync::Arc;

use futures::StreamExt;
use hmvc_dispatch::prelude::*;

// =============================================================================
// Handlers
// =============================================================================

/// Public page embedding the admin user list.
#[derive(Debug)]
struct Dashboard;

#[async_trait]
impl Handler for Dashboard {
    async fn handle(
        &self,
        _route: &Route,
        _args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        let widget = chain.execute(chain.request("/admin/users/recent")?).await?;
        let body = widget.response().map(|r| r.body.as_str()).unwrap_or_default();
        Ok(Response::ok(format!("<main>{body}</main>")))
    }
}

/// Internal handler, only reachable through a nested request.
#[derive(Debug)]
struct Users;

#[async_trait]
impl Handler for Users {
    async fn handle(
        &self,
        route: &Route,
        args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        let views = chain.current::<ViewFinder>().paths();
        chain
            .current::<AppLog>()
            .info(format_args!("rendering users from {views:?}"));
        Ok(Response::ok(format!(
            "<ul data-action=\"{}\">{}</ul>",
            route.action.as_deref().unwrap_or("Index"),
            args.join(",")
        )))
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    println!("=== hmvc-dispatch nested request example ===\n");

    let app = Application::builder("site")
        .path("/srv/site")
        .namespace(
            NamespaceEntry::new("/admin", "/srv/site/admin")
                .with_root("Admin")
                .non_routeable(),
        )
        .namespace(NamespaceEntry::new("", "/srv/site"))
        .router(TableRouter::new().alias("/", "/dashboard"))
        .with_handlers(|handlers| {
            handlers.register_handler("Controller\\Dashboard", Arc::new(Dashboard));
            handlers.register_handler("Admin\\Controller\\Users", Arc::new(Users));
        })
        .build();
    let kernel = Kernel::new(app);

    let (sender, mut events) = create_stream(DEFAULT_EVENT_BUFFER);
    let chain = kernel.chain().with_events(sender);

    let outcome = match chain.request("/") {
        Ok(request) => chain.execute(request).await,
        Err(err) => Err(err),
    };
    drop(chain);

    while let Some(event) = events.next().await {
        println!(
            "{:indent$}{:?} {}",
            "",
            event.state,
            event.resource,
            indent = event.depth * 2
        );
    }

    match outcome {
        Ok(request) => {
            let response = request.response().cloned().unwrap_or_else(|| Response::new(204, ""));
            println!("\n{} {}", response.status, response.body);
        }
        Err(err) => println!("\n❌ {err}"),
    }

    match kernel.dispatch("/admin/users").await {
        Ok(_) => println!("unexpected: internal namespace reached from outside"),
        Err(err) => println!("direct access refused: {err}"),
    }
}
