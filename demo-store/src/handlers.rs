use std::collections::HashMap;

use axum::{extract::Query, response::Html};

fn notice_banner(params: &HashMap<String, String>) -> String {
    match params.get("notice") {
        Some(notice) => format!("<p><em>{notice}</em></p>"),
        None => String::new(),
    }
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(
        r#"<h1>Demo store</h1>
<ul>
  <li><a href="/auth/redirect">Sign in with Google</a></li>
  <li><a href="/auth/redirect?is_register=true">Register with Google</a></li>
  <li><a href="/auth/redirect?is_at_checkout=true">Sign in with Google at checkout</a></li>
</ul>"#,
    )
}

pub(crate) async fn account(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    Html(format!(
        "{}<h1>Your account</h1><p>You are signed in.</p>",
        notice_banner(&params)
    ))
}

pub(crate) async fn checkout(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    Html(format!(
        "{}<h1>Checkout</h1><p>Welcome back, finish your order.</p>",
        notice_banner(&params)
    ))
}

pub(crate) async fn login(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    Html(format!(
        "{}<h1>Sign in</h1><p><a href=\"/auth/redirect\">Sign in with Google</a></p>",
        notice_banner(&params)
    ))
}
