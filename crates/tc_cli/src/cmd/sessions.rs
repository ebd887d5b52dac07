use crate::{cmd::Success, ctx::Ctx, error::Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Sessions;

impl Sessions {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let user_id = ctx.user_id()?;
        let sessions = ctx.sessions.list(user_id).await?;

        if sessions.is_empty() {
            return Ok("No stored sessions.".into());
        }

        Ok(Success::Table {
            header: vec!["ID".to_owned(), "TITLE".to_owned()],
            rows: sessions
                .into_iter()
                .map(|session| {
                    vec![session.session_id, session.title.unwrap_or_default()]
                })
                .collect(),
        })
    }
}
