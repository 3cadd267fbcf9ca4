// src/views.rs
use actix_web::HttpResponse;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn layout(title: &str, username: Option<&str>, content: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            r#"<span>Logged in as {}</span> <a href="/index">Predict</a> <a href="/logout">Logout</a>"#,
            escape(name)
        ),
        None => {
            r#"<a href="/login">Login</a> <a href="/register">Register</a> <a href="/index">Predict</a>"#
                .to_string()
        }
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Home</a> {nav}</nav>
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        content = content
    )
}

fn message_block(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<p class="message">{}</p>"#, escape(m)))
        .unwrap_or_default()
}

fn country_options(countries: &[&str]) -> String {
    countries
        .iter()
        .map(|c| {
            let c = escape(c);
            format!(r#"<option value="{c}">{c}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn home_page(countries: &[&str], username: Option<&str>) -> String {
    let content = format!(
        r#"<h1>Suicide Rate Prediction</h1>
<p>Estimate the suicide rate per 100k population from demographic and economic indicators.</p>
<h2>Supported countries</h2>
<ul>
{}
</ul>"#,
        countries
            .iter()
            .map(|c| format!("<li>{}</li>", escape(c)))
            .collect::<Vec<_>>()
            .join("\n")
    );
    layout("Home", username, &content)
}

pub fn register_page(message: Option<&str>) -> String {
    let content = format!(
        r#"<h1>Register</h1>
{}
<form method="post" action="/register">
<label>Username <input type="text" name="username" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Login</a></p>"#,
        message_block(message)
    );
    layout("Register", None, &content)
}

pub fn login_page(message: Option<&str>) -> String {
    let content = format!(
        r#"<h1>Login</h1>
{}
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Login</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
        message_block(message)
    );
    layout("Login", None, &content)
}

pub fn index_page(
    countries: &[&str],
    username: Option<&str>,
    prediction_text: Option<&str>,
) -> String {
    let number = |name: &str, label: &str| {
        format!(r#"<label>{label} <input type="number" name="{name}" required></label>"#)
    };
    let fields = [
        number("year", "Year"),
        number("gender", "Gender (0 = female, 1 = male)"),
        number("age_group", "Age group"),
        number("suicide_count", "Suicide count"),
        number("population", "Population"),
        number("gdp_for_year", "GDP for year"),
        number("gdp_per_capita", "GDP per capita"),
        number("generation", "Generation"),
    ]
    .join("\n");
    let result = prediction_text
        .map(|t| format!(r#"<h2 class="prediction">{}</h2>"#, escape(t)))
        .unwrap_or_default();
    let content = format!(
        r#"<h1>Predict Suicide Rate</h1>
<form method="post" action="/index">
<label>Country <select name="country" required>
{}
</select></label>
{}
<button type="submit">Predict</button>
</form>
{}"#,
        country_options(countries),
        fields,
        result
    );
    layout("Predict", username, &content)
}

pub fn error_page() -> String {
    layout(
        "Error",
        None,
        "<h1>Internal Server Error</h1>\n<p>Something went wrong while handling the request.</p>",
    )
}
