//! Renders one sample add card end-to-end (template, headshot fetch, owner
//! photo, captions) and writes it next to the process. Useful for tuning
//! layout coordinates without polling a live league.

use roster_activity_alerter::card::{AssetStore, CardFonts, CardLayout, CardRenderer, Compositor};
use roster_activity_alerter::owners::OwnerDirectory;
use roster_activity_alerter::{Transaction, TxKind};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let fonts = CardFonts::load(
        env_or("CAPTION_FONT_PATH", "fonts/arial.ttf"),
        env_or("SUBJECT_FONT_PATH", "fonts/arial_bold.ttf"),
    )?;
    // Self-contained owner mapping so the demo works without owner_map.json.
    let owners = OwnerDirectory::from_map(
        [("demo-owner".to_string(), "moja".to_string())]
            .into_iter()
            .collect(),
    );
    let compositor = Compositor::new(
        CardLayout::default(),
        fonts,
        AssetStore::new(
            env_or("TEMPLATE_PATH", "templates/template_add_or_drop.png"),
            env_or("OWNER_IMAGE_DIR", "owner_imgs"),
        ),
        owners,
    );

    let tx = Transaction {
        team_name: "moja".into(),
        owner_id: Some("demo-owner".into()),
        kind: TxKind::Add,
        subject_name: "Bucky Irving".into(),
        subject_id: Some(2577417),
        subject_image_url: Some(
            "https://a.espncdn.com/combiner/i?img=/i/headshots/nfl/players/full/2577417.png".into(),
        ),
        team_logo_url: None,
    };

    let card = compositor.render(&tx).await?;
    let out = env_or("LATEST_CARD_PATH", "out_add.png");
    card.image.save(&out)?;
    println!("wrote {out} (card id {})", card.id);
    Ok(())
}
