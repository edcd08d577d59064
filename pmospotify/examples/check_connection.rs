//! Vérification de la connexion à la Web API Spotify
//!
//! Cet exemple montre comment :
//! - Créer un client depuis la configuration (`sources.spotify.*`)
//! - Lire le profil de l'utilisateur
//! - Afficher le morceau en cours avec les genres et images de l'artiste
//! - Lister les derniers morceaux écoutés
//! - Afficher l'état du lecteur
//!
//! Un token peut être enregistré au préalable :
//!
//! ```bash
//! SPOTIFY_ACCESS_TOKEN=BQD... cargo run -p pmospotify --example check_connection
//! ```

use pmoconfig::get_config;
use pmospotify::{SpotifyClient, SpotifyConfigExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== PMOSpotify - Vérification de la connexion ===\n");

    let config = get_config();
    if let Ok(token) = std::env::var("SPOTIFY_ACCESS_TOKEN") {
        config.set_spotify_access_token(&token)?;
        println!("✓ Token enregistré (chiffré) dans la configuration");
    }

    let client = SpotifyClient::from_config(config)?;

    println!("--- Utilisateur ---");
    let user = client.current_user().await?;
    println!("✓ Connecté : {}", user.display_name.as_deref().unwrap_or(&user.id));
    if let Some(product) = &user.product {
        println!("  Abonnement: {}", product);
    }

    println!("\n--- Morceau en cours ---");
    match client.currently_playing().await? {
        Some(playing) => match playing.item {
            Some(track) => {
                let state = if playing.is_playing { "▶" } else { "⏸" };
                println!("{} {} - {}", state, track.main_artist().unwrap_or("?"), track.name);
                println!("  Album: {}", track.album.name);
                println!(
                    "  Position: {}s / {}s",
                    playing.progress_ms.unwrap_or(0) / 1000,
                    track.duration_ms / 1000
                );

                for artist in &track.artists {
                    let Some(id) = &artist.id else {
                        println!("  {} (fichier local)", artist.name);
                        continue;
                    };
                    let details = client.artist(id).await?;
                    println!("  {}", details.name);
                    if !details.genres.is_empty() {
                        println!("    Genres: {}", details.genres.join(", "));
                    }
                    if let Some(image) = details.images.first() {
                        println!("    Image: {}", image.url);
                    }
                }
            }
            None => println!("Lecture en cours sans information de morceau"),
        },
        None => println!("Aucun morceau en cours"),
    }

    println!("\n--- Derniers morceaux écoutés ---");
    for (i, entry) in client.recently_played(3).await?.iter().enumerate() {
        println!(
            "  {}. {} - {} ({})",
            i + 1,
            entry.track.main_artist().unwrap_or("?"),
            entry.track.name,
            entry.played_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("\n--- Lecteur ---");
    match client.playback_state().await? {
        Some(player) => {
            if let Some(device) = &player.device {
                println!("  Appareil: {} ({})", device.name, device.device_type);
                if let Some(volume) = device.volume_percent {
                    println!("  Volume: {}%", volume);
                }
            }
            println!("  Aléatoire: {}", if player.shuffle_state { "oui" } else { "non" });
            if let Some(repeat) = &player.repeat_state {
                println!("  Répétition: {}", repeat);
            }
        }
        None => println!("  Aucun appareil actif"),
    }

    Ok(())
}
