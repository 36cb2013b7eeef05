//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리에 JSON 파일로 설정을 저장/로드한다.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::MetricError;

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 앱 디렉토리 이름
const APP_DIR_NAME: &str = "maekbak";

/// 설정 관리자
///
/// 설정 파일의 로드/저장 및 런타임 설정 변경을 관리한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 현재 설정 (스레드 안전)
    config: Arc<RwLock<PipelineConfig>>,
    /// 설정 파일 경로
    config_path: PathBuf,
}

impl ConfigManager {
    /// 새 설정 관리자 생성 및 설정 로드
    ///
    /// 설정 파일이 없으면 기본 설정을 생성하고 저장한다.
    pub fn new() -> Result<Self, MetricError> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// 지정된 경로로 설정 관리자 생성
    pub fn with_path(config_path: PathBuf) -> Result<Self, MetricError> {
        // 설정 디렉토리 생성
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    MetricError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        // 설정 파일 로드 또는 기본값 생성
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = PipelineConfig::default_config();
            Self::save_to_file(&config_path, &default_config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            default_config
        };
        config.validate()?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 현재 설정 반환 (복제본)
    pub fn get(&self) -> Result<PipelineConfig, MetricError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|e| MetricError::Internal(format!("설정 잠금 실패: {e}")))
    }

    /// 설정 업데이트 및 파일 저장
    pub fn update(&self, new_config: PipelineConfig) -> Result<(), MetricError> {
        new_config.validate()?;

        // 메모리 업데이트
        {
            let mut config = self
                .config
                .write()
                .map_err(|e| MetricError::Internal(format!("설정 잠금 실패: {e}")))?;
            *config = new_config.clone();
        }

        // 파일 저장
        Self::save_to_file(&self.config_path, &new_config)?;
        debug!("설정 업데이트 저장: {}", self.config_path.display());
        Ok(())
    }

    /// 설정 파일 경로 반환
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// 플랫폼 기본 설정 파일 경로
    fn default_config_path() -> Result<PathBuf, MetricError> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok_or_else(|| {
                MetricError::Config("설정 디렉토리를 결정할 수 없음 (HOME 미설정)".to_string())
            })?;
        Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 파일에서 설정 로드
    fn load_from_file(path: &Path) -> Result<PipelineConfig, MetricError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MetricError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)?;
        debug!("설정 파일 로드: {}", path.display());
        Ok(config)
    }

    /// 파일에 설정 저장
    fn save_to_file(path: &Path, config: &PipelineConfig) -> Result<(), MetricError> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(path, json)
            .map_err(|e| MetricError::Config(format!("설정 파일 쓰기 실패: {}: {}", path.display(), e)))?;
        Ok(())
    }
}
