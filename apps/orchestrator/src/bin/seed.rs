// [apps/orchestrator/src/bin/seed.rs]
/*!
 * APARATO: DEVELOPMENT SEEDER (ESTRATO L6)
 * RESPONSABILIDAD: POBLAR UNA BASE LOCAL CON UN PROYECTO Y UNA CAMPAÑA DE
 * MUESTRA PARA DESARROLLO MANUAL CONTRA EL `/operator` Y `/client` NEST
 */

use cipherswarm_domain_models::{Attack, AttackMode, AttackState, CampaignPriority, ResourceKind};
use cipherswarm_infra_store::repositories::{AttackRepository, CampaignRepository, HashListRepository, ProjectRepository, ResourceRepository};
use cipherswarm_infra_store::StoreClient;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info,cipherswarm_infra_store=debug").with_target(false).init();

    info!("💠 [SEED]: starting development seed...");

    let database_url = std::env::var("DATABASE_URL").expect("CRITICAL_FAULT: DATABASE_URL is missing in environment.");
    let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();

    let database_client = match StoreClient::connect(&database_url, database_token).await {
        Ok(client) => client,
        Err(e) => {
            error!("❌ [SEED_FAULT]: UPLINK_COLLAPSE: {}", e);
            return Err(anyhow::anyhow!(e));
        }
    };

    let projects = ProjectRepository::new(database_client.clone());
    let hash_lists = HashListRepository::new(database_client.clone());
    let resources = ResourceRepository::new(database_client.clone());
    let campaigns = CampaignRepository::new(database_client.clone());
    let attacks = AttackRepository::new(database_client.clone());

    info!("⚙️  [SEED]: creating sample project...");
    let project = projects.create("Pentest Engagement Alpha").await?;

    info!("⚙️  [SEED]: creating sample hash list (NTLM)...");
    let hash_list = hash_lists
        .create(
            &project.id,
            "Domain Controller Dump",
            1000,
            &[
                ("b4b9b02e6f09a9bd760f388b67351e2b".to_string(), None),
                ("5835048ce94ad0564e29a924a03510ef".to_string(), None),
            ],
        )
        .await?;

    info!("⚙️  [SEED]: registering sample resources...");
    let word_list = resources
        .create("rockyou.txt", ResourceKind::WordList, "resources/rockyou.txt", false, &[project.id.clone()])
        .await?;
    resources.set_line_count(&word_list.id, 14_344_392).await?;

    let rule_list = resources
        .create("best64.rule", ResourceKind::RuleList, "resources/best64.rule", false, &[project.id.clone()])
        .await?;
    resources.set_line_count(&rule_list.id, 64).await?;

    info!("⚙️  [SEED]: creating sample campaign...");
    let campaign =
        campaigns.create(&project.id, "Alpha - Dictionary Sweep", CampaignPriority::Routine, &hash_list.id).await?;

    info!("⚙️  [SEED]: attaching dictionary attack...");
    attacks
        .create(
            &campaign.id,
            Attack {
                id: String::new(),
                campaign_id: String::new(),
                position: 0,
                attack_mode: AttackMode::Dictionary,
                word_list_id: Some(word_list.id),
                rule_list_id: Some(rule_list.id),
                mask_list_id: None,
                mask: None,
                custom_charset_1: None,
                custom_charset_2: None,
                custom_charset_3: None,
                custom_charset_4: None,
                increment_mode: false,
                increment_min: None,
                increment_max: None,
                workload_profile: 3,
                optimized: true,
                disable_markov: false,
                classic_markov: false,
                markov_threshold: None,
                slow_candidate_generators: false,
                start_time: None,
                end_time: None,
                state: AttackState::Pending,
            },
        )
        .await?;

    info!("✅ [SEED_COMPLETE]: project={} campaign={}", project.id, campaign.id);
    Ok(())
}
// FIN DEL ARCHIVO [apps/orchestrator/src/bin/seed.rs]
