#![allow(dead_code)]

use docmodel::{memory::InMemoryStore, prelude::*};

#[derive(Debug, Clone, Model)]
#[model(database = "polls", collection = "languages")]
pub struct Language {
    #[entity]
    entity: Entity,
}

#[derive(Debug, Clone, Model)]
#[model(database = "polls", collection = "campaigns")]
pub struct Campaign {
    entity: Entity,
    pub loads: u32,
}

pub fn language_schema() -> Schema {
    Schema::builder()
        .property("tag", ValueKind::String, true)
        .property("name", ValueKind::String, true)
        .property("rtl", ValueKind::Bool, false)
        .property("speakers", ValueKind::Int64, false)
        .unique("tag")
        .build()
}

pub async fn store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::builder().build().await.unwrap())
}
