//! Biblio Client - Library Management System
//!
//! A small command-line front-end over the client library, mirroring the
//! actions the web views perform.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_client::models::user::Role;
use biblio_client::{AppState, ClientConfig, FileSessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ClientConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblio_client={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let session = Arc::new(FileSessionStore::new(config.session.file.clone()));
    let state = AppState::new(config, session).context("Failed to build client")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parts: Vec<&str> = args.iter().map(String::as_str).collect();

    match parts.as_slice() {
        ["login", username, password] => {
            let session = state.repository.auth.login(username, password).await?;
            println!("Logged in as {} ({})", session.username, session.role);
        }
        ["logout"] => {
            state.repository.auth.logout();
            println!("Logged out");
        }
        ["books"] => print_books(&state.repository.books.list().await?),
        ["books", query] => print_books(&state.repository.books.search(query).await?),
        ["mybooks"] => print_books(&state.repository.my_books.list().await?),
        ["borrow", book_id] => {
            let snapshot = state.services.catalog.borrow(book_id, None).await?;
            println!("Borrowed {}", book_id);
            if let Some(counts) = snapshot.counts {
                println!("You now hold {} book(s)", counts.borrowed_by_me);
            }
        }
        ["return", book_id] => {
            let snapshot = state.services.catalog.return_book(book_id, None).await?;
            println!("Returned {}", book_id);
            if let Some(counts) = snapshot.counts {
                println!("You now hold {} book(s)", counts.borrowed_by_me);
            }
        }
        ["dashboard"] => {
            let counts = state.services.catalog.dashboard().await?;
            println!("Total books:      {}", counts.total_books);
            println!("Available copies: {}", counts.available_copies);
            println!("Borrowed by you:  {}", counts.borrowed_by_me);
            if let Some(total_users) = counts.total_users {
                println!("Total users:      {}", total_users);
            }
        }
        ["users"] => {
            for user in state.repository.admin_users.list().await? {
                println!(
                    "{:<24} {:<8} {} borrowed",
                    user.username,
                    user.role,
                    user.borrowed_books.len()
                );
            }
        }
        ["role", user_id, role] => {
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            state.services.catalog.change_user_role(user_id, role).await?;
            println!("Role of {} changed to {}", user_id, role);
        }
        ["delete-user", user_id] => {
            state.services.catalog.delete_user(user_id).await?;
            println!("Deleted user {}", user_id);
        }
        _ => {
            bail!(
                "Usage: biblio-client <command>\n\
                 \n\
                 Commands:\n\
                 \x20 login <username> <password>\n\
                 \x20 logout\n\
                 \x20 books [query]\n\
                 \x20 mybooks\n\
                 \x20 borrow <book-id>\n\
                 \x20 return <book-id>\n\
                 \x20 dashboard\n\
                 \x20 users\n\
                 \x20 role <user-id> <user|admin>\n\
                 \x20 delete-user <user-id>"
            );
        }
    }

    Ok(())
}

fn print_books(books: &[biblio_client::models::book::Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }
    for book in books {
        println!(
            "{:<12} {:<40} {:<24} {}/{} available",
            book.id, book.title, book.author, book.available_copies, book.total_copies
        );
    }
}
