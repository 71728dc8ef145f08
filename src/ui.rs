/// Terminal presentation
///
/// Renders the active screen and feeds line commands back into the session.
/// All decisions live in the session; this layer only matches on `Screen`.
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::Movie;
use crate::services::session::{Screen, Session};

pub async fn run(session: &Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let screen = session.screen().await;

        // Transient screens resolve on their own; poll until they settle.
        if matches!(screen, Screen::Intro | Screen::Loading) {
            tokio::time::sleep(Duration::from_millis(100)).await;
            continue;
        }

        render(session, &screen).await;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let input = line.trim().to_string();
        if input == "quit" {
            return Ok(());
        }

        match screen {
            Screen::Login => {
                if !input.is_empty() {
                    session.register_user(&input).await;
                }
            }
            Screen::Quiz { movie, .. } => handle_quiz_input(session, &movie, &input).await,
            Screen::Sync => handle_sync_input(session, &input).await,
            Screen::Recommendation { .. } => session.begin_sync().await,
            Screen::Error { .. } => {}
            Screen::Intro | Screen::Loading => {}
        }
    }
}

async fn render(session: &Session, screen: &Screen) {
    match screen {
        Screen::Intro => println!("CINEMATCH"),
        Screen::Loading => println!("Loading..."),
        Screen::Login => {
            println!("\nCINEMATCH");
            println!("Enter a name to sign up (or 'quit'):");
        }
        Screen::Quiz {
            movie,
            ratings_left,
        } => {
            println!("\n{} ({})", movie.title, movie.year);
            println!("{}", movie.plot);
            println!(
                "{} to go. Rate 1-5, 's' to skip (or 'quit'):",
                ratings_left
            );
        }
        Screen::Sync => {
            if let Some(user) = session.user().await {
                println!("\nHey {}!", user.name);
            }
            println!("Choose your movie partner:");
            let roster = session.roster().await;
            if roster.is_empty() {
                println!("  (no other users yet)");
            }
            for (i, partner) in roster.iter().enumerate() {
                println!("  {}. {}", i + 1, partner.name);
            }
            println!("Pick a number, or 'quiz' / 'logout' / 'quit':");
        }
        Screen::Recommendation { movies } => {
            println!("\nYou two will love these:");
            for movie in movies {
                println!("\n  {} ({})", movie.title, movie.year);
                for rationale in movie.rationales.iter().flatten() {
                    println!("    - {}", rationale);
                }
            }
            println!("Press enter to go back (or 'quit'):");
        }
        Screen::Error { message } => {
            println!("\n{}", message);
            println!("Type 'quit' to exit:");
        }
    }
}

async fn handle_quiz_input(session: &Session, movie: &Movie, input: &str) {
    if input == "s" {
        session.submit_rating(movie, -1).await;
        return;
    }
    match input.parse::<i32>() {
        Ok(stars) if (1..=5).contains(&stars) => {
            session.submit_rating(movie, stars - 1).await;
        }
        _ => println!("Rate 1-5 or 's' to skip."),
    }
}

async fn handle_sync_input(session: &Session, input: &str) {
    match input {
        "quiz" => session.begin_quiz().await,
        "logout" => session.logout().await,
        _ => {
            let roster = session.roster().await;
            match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= roster.len() => {
                    println!("Syncing...");
                    session.request_recommendations(&roster[n - 1].name).await;
                }
                _ => println!("Pick a partner number, 'quiz' or 'logout'."),
            }
        }
    }
}
