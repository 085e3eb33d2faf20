use actix_web::{self, middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::{Arc, LazyLock}};

use crate::{
    configs::{connect_database, http_client, run_migrations},
    middlewares::cors,
    modules::{
        storage::repository_supabase::SupabaseStorage,
        thumbnail::ffmpeg::FfmpegExtractor,
        uploader::{
            client::HttpProcessorClient,
            model::{LocalVideoFile, UploadConfig},
            service::UploaderService,
            session::{StatusMessage, UploadSession},
        },
        video::{
            repository_pg::VideoPgRepository,
            service::{ProcessorConfig, VideoProcessorService},
        },
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[derive(Parser)]
#[command(name = "video-ingest", about = "Video upload and thumbnail processing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the processor function over HTTP
    Serve,
    /// Upload a local video and wait for it to be processed
    Upload {
        /// Path to the video file
        file: PathBuf,
        /// Id of the uploading user
        #[arg(long)]
        owner: String,
        #[arg(long)]
        description: Option<String>,
        /// Comma separated, e.g. "skate, summer"
        #[arg(long)]
        tags: Option<String>,
    },
}

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Processor is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    LazyLock::force(&ENV);

    match cli.command {
        Commands::Serve => serve().await,
        Commands::Upload { file, owner, description, tags } => {
            upload(file, owner, description, tags).await
        }
    }
}

async fn serve() -> std::io::Result<()> {
    let service_key = ENV.service_role_key().map_err(std::io::Error::other)?;
    let db_pool = connect_database().await.map_err(std::io::Error::other)?;
    run_migrations(&db_pool).await.map_err(std::io::Error::other)?;

    let client = http_client().map_err(std::io::Error::other)?;
    let storage = SupabaseStorage::new(client, ENV.supabase_url.as_str(), service_key);
    let extractor = FfmpegExtractor::new(
        ENV.ffmpeg_path.as_str(),
        ENV.work_dir.clone(),
        ENV.thumbnail_quality,
    );
    let video_repo = VideoPgRepository::new(db_pool);

    let processor = VideoProcessorService::with_dependencies(
        Arc::new(storage),
        Arc::new(extractor),
        Arc::new(video_repo),
        ProcessorConfig::from_env(&ENV),
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors())
            .app_data(web::Data::new(processor.clone()))
            .service(health_check)
            .configure(modules::video::route::configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}

async fn upload(
    path: PathBuf,
    owner: String,
    description: Option<String>,
    tags: Option<String>,
) -> std::io::Result<()> {
    let anon_key = ENV.anon_key().map_err(std::io::Error::other)?;
    let client = http_client().map_err(std::io::Error::other)?;

    let storage = SupabaseStorage::new(client.clone(), ENV.supabase_url.as_str(), anon_key);
    let processor = HttpProcessorClient::new(client, ENV.functions_url.as_str(), anon_key);
    let service = UploaderService::with_dependencies(
        Arc::new(storage),
        Arc::new(processor),
        UploadConfig::from_env(&ENV),
    );
    let mut session = UploadSession::new(service, owner);

    let mut status = session.subscribe();
    actix_web::rt::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            match current.message {
                Some(StatusMessage::Info(msg)) => log::info!("[{}%] {}", current.progress, msg),
                Some(StatusMessage::Error(msg)) => log::error!("{}", msg),
                None => {}
            }
        }
    });

    let file = LocalVideoFile::open(&path).await?;
    log::info!("Selected {} ({})", file.name, file.display_size());
    session.select_file(file).map_err(std::io::Error::other)?;
    session.set_description(description.unwrap_or_default());
    session.set_tags(tags.unwrap_or_default());

    let video = session.publish().await.map_err(std::io::Error::other)?;
    println!(
        "Video {} published (video: {}, thumbnail: {})",
        video.video_id, video.video_path, video.thumbnail_path
    );
    Ok(())
}
