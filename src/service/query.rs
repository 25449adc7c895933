//! Query Service Module
//!
//! Builds cache keys from request parameters and runs each query kind through
//! its own `QueryCache`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{CachePolicy, QueryCache};
use crate::error::{QueryError, Result};
use crate::geo::{bounding_box_query, extract_coordinates, keyword_query, BoundingBox, FeatureStore};
use crate::models::{
    parse_bounding_box, parse_keyword, BoundingBoxResponse, CoordinatesList, FeatureList,
    FullCollection, QueryParams, RedliningResponse, SearchAreasResponse, StatsResponse,
    SuccessResponse,
};
use crate::service::{BoundingBoxKey, FullDumpKey, KeywordKey};

// == Query Service ==
/// Answers bounding-box, keyword and full-dataset queries over one feature store.
///
/// Each query kind has an independent cache; all share the same policy.
#[derive(Debug)]
pub struct QueryService {
    store: Arc<FeatureStore>,
    bounding_box_cache: QueryCache<BoundingBoxKey, Arc<BoundingBoxResponse>>,
    search_cache: QueryCache<KeywordKey, Arc<SearchAreasResponse>>,
    redlining_cache: QueryCache<FullDumpKey, Arc<RedliningResponse>>,
}

impl QueryService {
    // == Constructor ==
    pub fn new(store: Arc<FeatureStore>, policy: CachePolicy) -> Self {
        info!("Query caches configured: {:?}", policy);
        Self {
            store,
            bounding_box_cache: QueryCache::new(policy),
            search_cache: QueryCache::new(policy),
            redlining_cache: QueryCache::new(policy),
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    // == Bounding Box ==
    /// Features lying entirely inside the box given by `minLat`, `maxLat`, `minLng`, `maxLng`.
    pub async fn bounding_box(&self, params: &QueryParams) -> Result<Arc<BoundingBoxResponse>> {
        let bbox = parse_bounding_box(params)?;
        self.bounding_box_query(bbox).await
    }

    pub async fn bounding_box_query(&self, bbox: BoundingBox) -> Result<Arc<BoundingBoxResponse>> {
        let key = BoundingBoxKey::new(&bbox);
        self.bounding_box_cache
            .get_or_try_insert_with(key, || async move {
                let collection = self.store.collection().await?;
                let feature_list = bounding_box_query(&collection.features, &bbox);
                debug!("Bounding box {:?} matched {} features", bbox, feature_list.len());
                Ok::<_, QueryError>(Arc::new(SuccessResponse::new(FeatureList { feature_list })))
            })
            .await
    }

    // == Search Areas ==
    /// Coordinates of every feature whose description mentions `keyword`.
    pub async fn search_areas(&self, params: &QueryParams) -> Result<Arc<SearchAreasResponse>> {
        let keyword = parse_keyword(params)?;
        self.search_areas_keyword(keyword).await
    }

    pub async fn search_areas_keyword(&self, keyword: String) -> Result<Arc<SearchAreasResponse>> {
        self.search_cache
            .get_or_try_insert_with(keyword.clone(), || async move {
                let collection = self.store.collection().await?;
                let matches = keyword_query(&collection.features, &keyword)?;
                debug!("Keyword {:?} matched {} features", keyword, matches.len());
                let coordinates_list = extract_coordinates(&matches);
                Ok::<_, QueryError>(Arc::new(SuccessResponse::new(CoordinatesList {
                    coordinates_list,
                })))
            })
            .await
    }

    // == Redlining Data ==
    /// The full feature collection.
    pub async fn redlining_data(&self) -> Result<Arc<RedliningResponse>> {
        self.redlining_cache
            .get_or_try_insert_with((), || async {
                let collection = self.store.collection().await?;
                Ok::<_, QueryError>(Arc::new(SuccessResponse::new(FullCollection { collection })))
            })
            .await
    }

    // == Inspection ==
    pub fn bounding_box_cache(&self) -> &QueryCache<BoundingBoxKey, Arc<BoundingBoxResponse>> {
        &self.bounding_box_cache
    }

    pub fn search_cache(&self) -> &QueryCache<KeywordKey, Arc<SearchAreasResponse>> {
        &self.search_cache
    }

    pub fn redlining_cache(&self) -> &QueryCache<FullDumpKey, Arc<RedliningResponse>> {
        &self.redlining_cache
    }

    /// Statistics for all three caches.
    pub async fn stats(&self) -> StatsResponse {
        StatsResponse {
            caching_enabled: self.bounding_box_cache.policy().is_enabled(),
            features_loaded: self.store.is_loaded(),
            boundarybox: self.bounding_box_cache.stats().await.into(),
            searchareas: self.search_cache.stats().await.into(),
            redliningdata: self.redlining_cache.stats().await.into(),
        }
    }
}
