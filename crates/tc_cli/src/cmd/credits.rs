use crate::{cmd::Success, ctx::Ctx, error::Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Credits;

impl Credits {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let user_id = ctx.user_id()?;
        let gate = ctx.credits.can_chat(user_id).await?;

        let state = if gate.can_chat {
            "chat available"
        } else {
            "chat blocked"
        };

        Ok(format!("{} credits ({state})", gate.credits).into())
    }
}
