use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
    pub requires_auth: bool,
}

const fn public(path: &'static str, title: &'static str) -> Route {
    Route {
        path,
        title,
        requires_auth: false,
    }
}

const fn guarded(path: &'static str, title: &'static str) -> Route {
    Route {
        path,
        title,
        requires_auth: true,
    }
}

pub const ROUTES: &[Route] = &[
    public("/", "Home"),
    public("/about", "About"),
    public("/how-it-works", "How It Works"),
    public("/demo", "Demo"),
    public(LOGIN_PATH, "Login"),
    public("/register", "Register"),
    guarded("/dashboard", "Dashboard"),
    guarded("/profile", "Profile"),
    guarded("/credit-report", "Credit Report"),
    guarded("/score-history", "Score History"),
    guarded("/documents", "Documents"),
    guarded("/settings", "Settings"),
    public("/target-users", "Target Users"),
    public("/blog", "Blog"),
    public("/contact", "Contact"),
    public("/terms", "Terms"),
    public("/privacy", "Privacy"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RouteResolution {
    Render { route: Route },
    Redirect { to: &'static str },
    NotFound,
}

pub fn find(path: &str) -> Option<&'static Route> {
    let normalized = normalize(path);
    ROUTES.iter().find(|route| route.path == normalized)
}

/// Resolves `path` for a visitor. Guarded pages send visitors without a
/// session to the login page.
pub fn resolve(path: &str, has_session: bool) -> RouteResolution {
    match find(path) {
        Some(route) if route.requires_auth && !has_session => {
            RouteResolution::Redirect { to: LOGIN_PATH }
        }
        Some(route) => RouteResolution::Render { route: *route },
        None => RouteResolution::NotFound,
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
