use rand::Rng;

use crate::advice::AdviceSelector;
use crate::error::AdviceError;
use crate::intent::classify_intent;
use crate::knowledge::KnowledgeBase;
use crate::models::{AdvisorReply, ReplyRoute, UserProfile};
use crate::personalize::personalize;

/// Quick responses short-circuit classification; everything else runs
/// classify → select → personalize. Malformed profiles are rejected on
/// both paths.
pub fn compose_response<R>(
    kb: &KnowledgeBase,
    message: &str,
    profile: &UserProfile,
    rng: &mut R,
) -> Result<AdvisorReply, AdviceError>
where
    R: Rng + ?Sized,
{
    profile.validate()?;

    if let Some(quick) = kb.quick_response(message) {
        return Ok(AdvisorReply {
            text: personalize(&quick.answer, profile),
            route: ReplyRoute::QuickResponse {
                keyword: quick.keyword.clone(),
            },
        });
    }

    let intent = classify_intent(message);
    let base = AdviceSelector::new(kb).select(intent, profile, rng)?;

    Ok(AdvisorReply {
        text: personalize(&base, profile),
        route: ReplyRoute::Advice { intent },
    })
}
