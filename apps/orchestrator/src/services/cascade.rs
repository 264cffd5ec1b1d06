// [apps/orchestrator/src/services/cascade.rs]
/*!
 * APARATO: EFFECT CASCADE DISPATCHER (ESTRATO L4)
 * RESPONSABILIDAD: TRADUCIR LOS EFECTOS PUROS DE `transitions.rs` EN
 * ESCRITURAS Y DIFUSIONES REALES, UNA VEZ QUE LA ESCRITURA QUE LOS
 * ORIGINO YA SE CONFIRMO
 *
 * `transitions.rs` nunca toca la base ni el bus de eventos — solo decide.
 * Aquí es donde un `Effect::CascadeAttack` se convierte en una llamada real
 * a `AttackRepository::apply_event`, y un `AttackEffect::CascadeCampaign`
 * en una llamada real a `CampaignRepository::apply_event`, recursivamente.
 */

use crate::state::AppState;
use cipherswarm_infra_store::{AttackEffect, AttackEvent, CampaignEffect, Effect, StoreResult};
use tracing::{instrument, warn};

#[instrument(skip(state, effects))]
pub async fn dispatch_task_effects(state: &AppState, effects: Vec<Effect>) -> StoreResult<()> {
    for effect in effects {
        match effect {
            Effect::Broadcast(event) => state.event_bus.broadcast(event),
            Effect::CascadeAttack { attack_id, event } => {
                let (_, attack_effects) = state.attacks.apply_event(&attack_id, event).await?;
                Box::pin(dispatch_attack_effects(state, &attack_id, attack_effects)).await?;
            }
            Effect::PurgeStatusHistory { .. } => {
                // Already enforced inline by `StatusRepository::append`'s trim-to-N delete.
            }
        }
    }
    Ok(())
}

/// `attack_id` is the attack these effects were raised against — needed for
/// the bulk task-table cascades, which the `AttackEffect` variants
/// themselves carry no identifier for.
#[instrument(skip(state, effects))]
pub async fn dispatch_attack_effects(state: &AppState, attack_id: &str, effects: Vec<AttackEffect>) -> StoreResult<()> {
    for effect in effects {
        match effect {
            AttackEffect::Broadcast(event) => state.event_bus.broadcast(event),
            AttackEffect::CascadeTasksPause => {
                state.tasks.pause_all_for_attack(attack_id).await?;
            }
            AttackEffect::CascadeTasksResume => {
                state.tasks.resume_all_for_attack(attack_id).await?;
            }
            AttackEffect::DestroyChildTasks => {
                state.tasks.destroy_all_for_attack(attack_id).await?;
            }
            AttackEffect::ForceCompleteRemainingTasks => {
                state.tasks.force_complete_remaining(attack_id).await?;
            }
            AttackEffect::CascadeCampaign { campaign_id, event } => {
                let (_, campaign_effects) = state.campaigns.apply_event(&campaign_id, event).await?;
                dispatch_campaign_effects(state, campaign_effects).await?;
            }
            AttackEffect::CascadeTasksCancel => {
                state.tasks.cancel_all_for_attack(attack_id).await?;
            }
        }
    }
    Ok(())
}

#[instrument(skip(state, effects))]
pub async fn dispatch_campaign_effects(state: &AppState, effects: Vec<CampaignEffect>) -> StoreResult<()> {
    for effect in effects {
        match effect {
            CampaignEffect::Broadcast(event) => state.event_bus.broadcast(event),
            CampaignEffect::CascadeSiblingAttacksComplete { campaign_id } => {
                match state.attacks.list_incomplete_for_campaign(&campaign_id).await {
                    Ok(sibling_ids) => {
                        for sibling_attack_id in sibling_ids {
                            match state.attacks.apply_event(&sibling_attack_id, AttackEvent::Complete).await {
                                Ok((_, sibling_effects)) => {
                                    if let Err(err) =
                                        Box::pin(dispatch_attack_effects(state, &sibling_attack_id, sibling_effects))
                                            .await
                                    {
                                        warn!("sibling completion fanout dispatch failed for attack {sibling_attack_id}: {err}");
                                    }
                                }
                                Err(err) => {
                                    warn!("sibling attack {sibling_attack_id} did not accept fanout completion: {err}");
                                }
                            }
                        }
                    }
                    Err(err) => warn!("failed to list sibling attacks for campaign {campaign_id}: {err}"),
                }
            }
        }
    }
    Ok(())
}
