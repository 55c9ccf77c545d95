use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::RepositoryResult;
use bson::{doc, Document};
use mongodb::{
    options::{ClientOptions, Credential, IndexOptions, ResolverConfig},
    Client, Database, IndexModel,
};
use tracing::{info, instrument};

pub const USERS: &str = "users";
pub const PROPERTIES: &str = "properties";
pub const INQUIRIES: &str = "inquiries";
pub const CONTACTS: &str = "contacts";
pub const SUBSCRIBERS: &str = "subscribers";

/// Open the process-wide client and return the configured database
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("DreamNestBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(Credential::builder()
            .username(username.clone())
            .password(password.clone())
            .build());
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 }, None).await?;
    info!("Connected to MongoDB");
    Ok(db)
}

/// Unique indexes the duplicate checks rely on
pub async fn ensure_indexes(db: &Database) -> RepositoryResult<()> {
    for collection in [USERS, SUBSCRIBERS] {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        db.collection::<Document>(collection).create_index(index, None).await?;
        info!(collection, "Unique email index ensured");
    }

    let by_created = IndexModel::builder().keys(doc! { "status": 1, "createdAt": -1 }).build();
    db.collection::<Document>(PROPERTIES).create_index(by_created, None).await?;
    Ok(())
}
