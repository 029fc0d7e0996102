//! Recommendation orchestrator
//!
//! A request moves through `PathSelect -> Search -> Filter -> Rank ->
//! Discount`. The vector path embeds the query and searches the index; the
//! fallback path scores every admitted facility from its attributes. Scores
//! from the two paths are never mixed in one response.

use crate::config::EngineConfig;
use crate::discount::DiscountAdjuster;
use crate::error::{EngineError, Result};
use crate::path::{select_path, Capabilities, SearchPath};
use crate::query::expand_query;
use crate::rank::{rank, Candidate};
use crate::relax::{hint, plan_relaxation};
use crate::request::{RecommendationRequest, ValidatedRequest};
use crate::response::{FallbackReason, RecommendationResponse, RecommendationResult, TrendingItem};
use crate::snapshot::{CatalogSnapshot, HardConstraints};
use hyurim_core::{
    fingerprint, DiscountPolicyRepository, EmbeddingCache, EmbeddingProvider, Error as CoreError, FacilityId,
    FacilityRecord, FacilityRepository, InMemoryRepository, ProviderStatus, StayPeriod, Vector, VectorIndex,
};
use hyurim_similarity::{price_proximity, FallbackScorer, ScoringError, ScoringQuery};
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one index rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub indexed: usize,
    pub reused: usize,
    pub embedded: usize,
    pub evicted: usize,
    pub generation: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub provider: ProviderStatus,
    pub index_built: bool,
    pub index_size: usize,
    pub index_generation: u64,
    pub index_dimension: Option<usize>,
    pub cached_embeddings: usize,
}

struct SearchOutcome {
    path: SearchPath,
    candidates: Vec<Candidate>,
}

pub struct Recommender {
    config: EngineConfig,
    facilities: Arc<dyn FacilityRepository>,
    policies: Arc<dyn DiscountPolicyRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    capabilities: Capabilities,
    index: VectorIndex,
    scorer: FallbackScorer,
    adjuster: DiscountAdjuster,
    /// Held only for lookups and updates, never across embedding
    cache: Mutex<EmbeddingCache>,
    rebuild_lock: Mutex<()>,
}

impl Recommender {
    /// Create an engine. The provider is checked once here and the verdict
    /// holds for the lifetime of the engine.
    pub fn new(
        config: EngineConfig,
        facilities: Arc<dyn FacilityRepository>,
        policies: Arc<dyn DiscountPolicyRepository>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let scorer = FallbackScorer::new(config.weights, config.capacity_slack)?;
        let capabilities = Capabilities::detect(provider.as_ref());

        Ok(Self {
            config,
            facilities,
            policies,
            provider,
            capabilities,
            index: VectorIndex::new(),
            scorer,
            adjuster: DiscountAdjuster::new(),
            cache: Mutex::new(EmbeddingCache::new()),
            rebuild_lock: Mutex::new(()),
        })
    }

    /// Engine over one in-memory repository with the configured provider
    pub fn with_repository(config: EngineConfig, repository: Arc<InMemoryRepository>) -> Result<Self> {
        let provider = config.embedding.build_provider();
        Self::new(config, repository.clone(), repository, provider)
    }

    /// Seed the embedding cache, typically from disk
    #[must_use]
    pub fn with_cache(self, cache: EmbeddingCache) -> Self {
        *self.cache.lock() = cache;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn cache_snapshot(&self) -> EmbeddingCache {
        self.cache.lock().clone()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            provider: self.capabilities.provider.clone(),
            index_built: self.index.is_built(),
            index_size: self.index.len(),
            index_generation: self.index.generation(),
            index_dimension: self.index.dim(),
            cached_embeddings: self.cache.lock().len(),
        }
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        let request = request.validate(&self.config).map_err(|e| {
            tracing::warn!(error = %e, "rejected recommendation request");
            e
        })?;

        let snapshot = CatalogSnapshot::load(self.facilities.as_ref(), self.policies.as_ref())?;
        let constraints = HardConstraints::from_request(&request);
        let path = select_path(self.capabilities.embeddings_available(), self.index.is_built());
        tracing::debug!(?path, facilities = snapshot.len(), "search path selected");

        let mut outcome = self.search(path, &snapshot, &request, &constraints)?;
        let mut relaxation = None;

        if outcome.candidates.is_empty() {
            let plan = plan_relaxation(&snapshot, &constraints);
            match plan.as_ref() {
                Some(plan) if request.allow_relaxation => {
                    tracing::info!(dropped = ?plan.dropped, "no candidates, retrying with relaxed constraints");
                    outcome = self.search(path, &snapshot, &request, &plan.constraints)?;
                    relaxation = Some(hint(Some(plan), !outcome.candidates.is_empty()));
                }
                _ => {
                    tracing::info!(relaxable = plan.is_some(), "no candidates satisfy the request");
                    relaxation = Some(hint(plan.as_ref(), false));
                }
            }
        }

        let ranked = rank(outcome.candidates, request.result_count, self.config.max_per_forest);
        let mut results: Vec<RecommendationResult> = ranked
            .into_iter()
            .filter_map(|candidate| self.present(&snapshot, &request, candidate))
            .collect();
        for (i, result) in results.iter_mut().enumerate() {
            result.rank = i + 1;
        }

        Ok(RecommendationResponse {
            degraded: outcome.path.is_degraded(),
            path: outcome.path.kind(),
            fallback_reason: outcome.path.fallback_reason(),
            inferred_capacity: request.inferred_capacity,
            results,
            relaxation,
        })
    }

    fn search(
        &self,
        path: SearchPath,
        snapshot: &CatalogSnapshot,
        request: &ValidatedRequest,
        constraints: &HardConstraints,
    ) -> Result<SearchOutcome> {
        if path != SearchPath::Vector {
            return Ok(self.fallback_search(path, snapshot, request, constraints));
        }

        match self.vector_candidates(snapshot, request, constraints) {
            Ok(candidates) if !candidates.is_empty() => Ok(SearchOutcome { path, candidates }),
            // nothing is admitted at all, so the fallback would not find anything either
            Ok(_) if snapshot.count_admitted(constraints) == 0 => Ok(SearchOutcome {
                path,
                candidates: Vec::new(),
            }),
            Ok(_) => Ok(self.fallback_search(
                SearchPath::Fallback(FallbackReason::VectorNoCandidates),
                snapshot,
                request,
                constraints,
            )),
            Err(e) if e.is_recoverable_by_fallback() => {
                let reason = match &e {
                    CoreError::IndexNotBuilt => FallbackReason::IndexNotBuilt,
                    _ => {
                        tracing::warn!(error = %e, "query embedding failed");
                        FallbackReason::ProviderUnavailable
                    }
                };
                Ok(self.fallback_search(SearchPath::Fallback(reason), snapshot, request, constraints))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn vector_candidates(
        &self,
        snapshot: &CatalogSnapshot,
        request: &ValidatedRequest,
        constraints: &HardConstraints,
    ) -> hyurim_core::Result<Vec<Candidate>> {
        let query = self.provider.embed(&expand_query(&request.query, request.capacity))?;
        let hits = self.index.search(&query, self.config.top_k)?;

        let mut stale = 0usize;
        let candidates: Vec<Candidate> = hits
            .into_iter()
            .filter_map(|(id, score)| {
                let Some(facility) = snapshot.facility(id) else {
                    stale += 1;
                    return None;
                };
                constraints
                    .admits(facility, snapshot.forest(&facility.forest_id))
                    .then(|| Candidate {
                        facility_id: id,
                        forest_id: facility.forest_id.clone(),
                        score: self.vector_score(score, facility, request),
                        breakdown: None,
                    })
            })
            .collect();

        if stale > 0 {
            tracing::warn!(stale, "dropped vector hits missing from the repository; index needs a rebuild");
        }
        Ok(candidates)
    }

    /// Cosine similarity, blended with budget proximity when a budget is given
    fn vector_score(&self, cosine: f32, facility: &FacilityRecord, request: &ValidatedRequest) -> f32 {
        let cosine = cosine.clamp(0.0, 1.0);
        if request.budget.is_none() {
            return cosine;
        }
        let weight = self.config.vector_budget_weight;
        let price = price_proximity(facility.price_for(request.stay_period), request.budget);
        ((1.0 - weight) * cosine + weight * price).clamp(0.0, 1.0)
    }

    fn fallback_search(
        &self,
        path: SearchPath,
        snapshot: &CatalogSnapshot,
        request: &ValidatedRequest,
        constraints: &HardConstraints,
    ) -> SearchOutcome {
        if let Some(reason) = path.fallback_reason() {
            tracing::info!(reason = reason.as_str(), "serving request from fallback scorer");
        }

        let query = ScoringQuery {
            text: &request.query,
            capacity: constraints.capacity,
            budget: request.budget,
            stay_period: request.stay_period,
        };

        let candidates = match self.scorer.score_all(snapshot.admitted(constraints), &query) {
            Ok(scored) => scored
                .into_iter()
                .filter_map(|scored| {
                    let facility = snapshot.facility(scored.facility_id)?;
                    Some(Candidate {
                        facility_id: scored.facility_id,
                        forest_id: facility.forest_id.clone(),
                        score: scored.score,
                        breakdown: Some(scored.breakdown),
                    })
                })
                .collect(),
            Err(ScoringError::NoCandidates) => Vec::new(),
        };

        SearchOutcome { path, candidates }
    }

    fn present(
        &self,
        snapshot: &CatalogSnapshot,
        request: &ValidatedRequest,
        candidate: Candidate,
    ) -> Option<RecommendationResult> {
        let facility = snapshot.facility(candidate.facility_id)?;
        let forest_name = snapshot
            .forest(&facility.forest_id)
            .map(|f| f.name.clone())
            .unwrap_or_default();
        let base_price = facility.price_for(request.stay_period).unwrap_or(0);
        let discount = self.adjuster.apply(
            facility,
            base_price,
            snapshot.policies_for(&facility.forest_id),
            &request.attributes,
        );

        Some(RecommendationResult {
            facility_id: facility.id,
            forest_id: facility.forest_id.clone(),
            facility_name: facility.name.clone(),
            forest_name,
            capacity_standard: facility.capacity_standard,
            base_price,
            effective_price: discount.effective_price,
            applied_policy_id: discount.policy_id,
            discount_amount: discount.discount_amount,
            similarity_score: candidate.score,
            rank: 0,
            score_breakdown: candidate.breakdown,
        })
    }

    /// Most popular facilities, ties by ascending id, priced off-weekday
    pub fn trending(&self, limit: usize) -> Result<Vec<TrendingItem>> {
        if limit == 0 || limit > self.config.max_result_count {
            return Err(EngineError::invalid(
                "limit",
                format!("must be between 1 and {}", self.config.max_result_count),
            ));
        }

        let forests = self.facilities.list_forests()?;
        let mut facilities = self.facilities.list_facilities()?;
        facilities.sort_by_key(|f| (Reverse(OrderedFloat(f.popularity_score())), f.id));
        facilities.truncate(limit);

        Ok(facilities
            .into_iter()
            .enumerate()
            .map(|(i, facility)| {
                let forest_name = forests
                    .iter()
                    .find(|forest| forest.id == facility.forest_id)
                    .map(|forest| forest.name.clone())
                    .unwrap_or_default();
                TrendingItem {
                    facility_id: facility.id,
                    base_price: facility.price_for(StayPeriod::OffWeekday).unwrap_or(0),
                    popularity: facility.popularity_score(),
                    forest_id: facility.forest_id,
                    facility_name: facility.name,
                    forest_name,
                    rank: i + 1,
                }
            })
            .collect())
    }

    /// Re-embed changed facilities and swap in a new index.
    ///
    /// Cached embeddings whose text fingerprint still matches are reused.
    /// Searches running during a rebuild keep using the previous index.
    pub fn rebuild_index(&self) -> Result<RebuildReport> {
        if let ProviderStatus::Unavailable { reason } = &self.capabilities.provider {
            return Err(CoreError::ProviderUnavailable(reason.clone()).into());
        }

        let _rebuild = self.rebuild_lock.lock();
        let started = Instant::now();

        let forests = self.facilities.list_forests()?;
        let facilities = self.facilities.list_facilities()?;
        let provider_name = self.provider.name().to_string();
        let dimension = self.provider.dimension();

        let mut entries: Vec<(FacilityId, Vector)> = Vec::with_capacity(facilities.len());
        let mut pending: Vec<(FacilityId, String, String)> = Vec::new();
        let mut live: HashSet<FacilityId> = HashSet::with_capacity(facilities.len());

        {
            let cache = self.cache.lock();
            for facility in &facilities {
                let forest = forests.iter().find(|f| f.id == facility.forest_id);
                let text = facility.document_text(forest);
                let fp = fingerprint(&provider_name, dimension, &text);
                live.insert(facility.id);
                match cache.get_fresh(facility.id, &fp) {
                    Some(vector) => entries.push((facility.id, vector.clone())),
                    None => pending.push((facility.id, fp, text)),
                }
            }
        }
        let reused = entries.len();

        let provider = self.provider.as_ref();
        let embedded: Vec<(FacilityId, String, Vector)> = pending
            .into_par_iter()
            .map(|(id, fp, text)| provider.embed(&text).map(|vector| (id, fp, vector)))
            .collect::<hyurim_core::Result<_>>()?;
        let embedded_count = embedded.len();

        let evicted = {
            let mut cache = self.cache.lock();
            for (id, fp, vector) in embedded {
                entries.push((id, vector.clone()));
                cache.insert(id, fp, vector);
            }
            cache.retain_ids(&live)
        };
        let indexed = entries.len();
        let generation = self.index.build(entries)?;

        let report = RebuildReport {
            indexed,
            reused,
            embedded: embedded_count,
            evicted,
            generation,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            indexed = report.indexed,
            reused = report.reused,
            embedded = report.embedded,
            evicted = report.evicted,
            generation = report.generation,
            "vector index rebuilt"
        );
        Ok(report)
    }
}
