//! Route table and page metadata.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

impl Robots {
    pub const ALL: Robots = Robots {
        index: true,
        follow: true,
    };

    /// `<meta name="robots">` content.
    pub fn content(&self) -> String {
        format!(
            "{}, {}",
            if self.index { "index" } else { "noindex" },
            if self.follow { "follow" } else { "nofollow" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    SignIn,
    AuthCallback,
    Calendar,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub kind: PageKind,
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub robots: Robots,
}

pub const PAGES: &[Page] = &[
    Page {
        kind: PageKind::Home,
        path: "/",
        title: "GrowLabtech.com",
        description: "This is a custom website",
        robots: Robots::ALL,
    },
    Page {
        kind: PageKind::SignIn,
        path: "/signin",
        title: "Sign In | GrowLabtech.com",
        description: "Sign in with your Google account",
        robots: Robots::ALL,
    },
    Page {
        kind: PageKind::AuthCallback,
        path: "/auth/callback",
        title: "Authorizing | GrowLabtech.com",
        description: "Completing Google sign-in",
        robots: Robots {
            index: false,
            follow: false,
        },
    },
    Page {
        kind: PageKind::Calendar,
        path: "/calendar",
        title: "My Calendar | SaaS Platform",
        description: "View and manage your Google Calendar events",
        robots: Robots {
            index: false,
            follow: true,
        },
    },
];

pub const NOT_FOUND: Page = Page {
    kind: PageKind::NotFound,
    path: "",
    title: "Page Not Found | GrowLabtech.com",
    description: "The page you are looking for does not exist",
    robots: Robots {
        index: false,
        follow: true,
    },
};

/// Resolve `path` (query string and trailing slash ignored) to its page.
pub fn route(path: &str) -> &'static Page {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    PAGES
        .iter()
        .find(|page| page.path == trimmed)
        .unwrap_or(&NOT_FOUND)
}
