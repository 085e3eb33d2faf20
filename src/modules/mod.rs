pub mod storage {
    pub mod model;
    pub mod repository;
    pub mod repository_supabase;
}

pub mod thumbnail {
    pub mod extractor;
    pub mod ffmpeg;
}

pub mod video {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod uploader {
    pub mod model;
    pub mod client;
    pub mod service;
    pub mod session;
}
