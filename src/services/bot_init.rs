use serenity::{
    client::Context,
    gateway::ActivityData,
    model::{
        gateway::Ready
    }
};

use tracing::{info};

pub fn ready(ctx: &Context, ready: &Ready) {
    info!("Logged in as {} in {} guild(s)", ready.user.name, ready.guilds.len());
    ctx.set_activity(Some(ActivityData::watching("GPU benchmarks")));
}
