// templates/pages/home.rs

use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn home_page(user: Option<&str>) -> Markup {
    desktop_layout(
        "Dashboard Techadores",
        user,
        html! {
            main class="container" style="text-align: center; padding-top: 96px;" {
                h1 style="font-size: 2.5rem;" { "Dashboard Techadores" }
                p class="muted" style="font-size: 1.2rem;" {
                    "Gérez vos leads de techado en temps réel avec des analyses et filtres avancés"
                }
                p {
                    a href="/dashboard" class="btn" { "Accéder au Dashboard →" }
                }
            }
        },
    )
}
