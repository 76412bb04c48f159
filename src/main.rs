use std::{error::Error, sync::Arc};

use log::{error, info, warn};
use rollermate::{
    api::{auth::AuthClient, ApiClient},
    config::{command::PostArgs, Command, Config},
    display::{display_feed, display_profile},
    feed::Feed,
    gateway::RemoteGateway,
    profile::ProfileView,
    publish::{ImageAttachment, PostDraft},
    session::{FileSessionStore, SessionContext},
    unit,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();
    info!("# RollerMate #");
    info!("");

    if !config.has_credentials() {
        warn!("SUPABASE_URL or SUPABASE_ANON_KEY is not set");
    }

    let client = ApiClient::new(&config);
    let store = FileSessionStore::new(config.session_file().clone());
    let session = Arc::new(SessionContext::new(
        AuthClient::new(client.clone()),
        Box::new(store),
    ));
    let gateway = RemoteGateway::new(client, session.clone());

    unit!("Restoring session", session.acquire().await);
    if config.has_credentials() {
        unit!("Connection test", gateway.probe().await);
    }

    let result = run(&config, &session, &gateway).await;
    if let Err(e) = &result {
        if e.is_unauthenticated() {
            error!("Not signed in, use `rollermate login` first");
        } else {
            error!("Operation failed: {}", e);
        }
    }
    Ok(result?)
}

async fn run(
    config: &Config,
    session: &SessionContext,
    gateway: &RemoteGateway,
) -> rollermate::Result<()> {
    match config.command() {
        Command::Login { email, password } => {
            let id = session.sign_in(email, password).await?;
            info!("Signed in as {}", id);
        }
        Command::Logout => session.sign_out().await,
        Command::Whoami => match session.identity().await {
            Some(id) => info!(
                "{} <{}>",
                id,
                session.email().await.unwrap_or_default()
            ),
            None => info!("Not signed in"),
        },
        Command::Feed => {
            let mut feed = Feed::new(gateway);
            unit!("Loading feed", feed.refresh().await)?;
            display_feed(feed.posts());
        }
        Command::Profile { id } => {
            let mut view = ProfileView::new(gateway, *id);
            unit!("Loading profile", view.load().await)?;
            if let Some(profile) = view.profile() {
                display_profile(profile.value());
            }
        }
        Command::Like { post } => {
            let mut feed = Feed::new(gateway);
            feed.refresh().await?;
            unit!("Toggling like", feed.toggle_like(*post).await)?;
            display_feed(feed.get(*post).map(|p| p.value()));
        }
        Command::Follow { user } => {
            let mut view = ProfileView::new(gateway, *user);
            view.load().await?;
            unit!("Toggling follow", view.toggle_follow().await)?;
            if let Some(profile) = view.profile() {
                display_profile(profile.value());
            }
        }
        Command::Post(args) => {
            let draft = draft(args).await?;
            let mut feed = Feed::new(gateway);
            unit!("Publishing", feed.publish(draft).await)?;
            display_feed(feed.posts().take(1));
        }
    }
    Ok(())
}

async fn draft(args: &PostArgs) -> rollermate::Result<PostDraft> {
    let image = match &args.image {
        Some(path) => Some(ImageAttachment::from_path(path).await?),
        None => None,
    };
    Ok(PostDraft {
        content: args.content.clone().unwrap_or_default(),
        image,
        location: args.location(),
    })
}
