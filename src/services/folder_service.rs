use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    auth::{require_owner, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{Folder, User},
        dto::{
            request::FolderRequest,
            response::{FolderDto, PaginatedResponse},
        },
    },
    repositories::{FolderRepository, UserRepository},
    services::{
        access_code::{is_well_formed_access_code, AccessCodeGenerator},
        cascade::CascadeDeleter,
    },
};

/// Attempts at drawing an unused access code before giving up.
pub const MAX_ACCESS_CODE_ATTEMPTS: usize = 16;

pub struct FolderService {
    folders: Arc<dyn FolderRepository>,
    users: Arc<dyn UserRepository>,
    cascade: Arc<CascadeDeleter>,
    codes: Arc<dyn AccessCodeGenerator>,
    enforce_ownership: bool,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        users: Arc<dyn UserRepository>,
        cascade: Arc<CascadeDeleter>,
        codes: Arc<dyn AccessCodeGenerator>,
        enforce_ownership: bool,
    ) -> Self {
        Self {
            folders,
            users,
            cascade,
            codes,
            enforce_ownership,
        }
    }

    /// Creates a folder owned by the caller with a freshly drawn access code.
    pub async fn create_folder(&self, caller: &Claims, request: FolderRequest) -> AppResult<FolderDto> {
        request.validate()?;

        for _ in 0..MAX_ACCESS_CODE_ATTEMPTS {
            let code = self.codes.generate();
            if !is_well_formed_access_code(&code) {
                return Err(AppError::InternalError(format!(
                    "Access code generator produced malformed code '{}'",
                    code
                )));
            }

            if self.folders.find_by_access_code(&code).await?.is_some() {
                log::debug!("Access code collision, drawing again");
                continue;
            }

            let folder = Folder::new(&request.name, &code, &caller.sub);
            match self.folders.create(folder).await {
                Ok(folder) => {
                    log::info!("Folder '{}' created by {}", folder.name, caller.username);
                    return self.to_dto(folder).await;
                }
                // Lost a race for the code against a concurrent create
                Err(AppError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::InternalError(
            "Could not allocate a unique access code".to_string(),
        ))
    }

    pub async fn get_folder(&self, id: &str) -> AppResult<FolderDto> {
        let folder = self.find_folder(id).await?;
        self.to_dto(folder).await
    }

    pub async fn list_folders(&self, offset: i64, limit: i64) -> AppResult<PaginatedResponse<FolderDto>> {
        let (folders, total) = self.folders.list(offset, limit).await?;

        let mut owners: HashMap<String, Option<User>> = HashMap::new();
        let mut items = Vec::with_capacity(folders.len());
        for folder in folders {
            if !owners.contains_key(&folder.owner_id) {
                let owner = self.users.find_by_id(&folder.owner_id).await?;
                owners.insert(folder.owner_id.clone(), owner);
            }
            let owner = owners.get(&folder.owner_id).cloned().flatten();
            items.push(FolderDto::new(folder, owner));
        }

        Ok(PaginatedResponse::new(items, offset, limit, total))
    }

    /// Renames a folder. The access code and owner never change.
    pub async fn update_folder(
        &self,
        caller: &Claims,
        id: &str,
        request: FolderRequest,
    ) -> AppResult<FolderDto> {
        request.validate()?;

        let mut folder = self.find_folder(id).await?;
        self.check_ownership(caller, &folder)?;

        folder.name = request.name;
        let folder = self.folders.update(folder).await?;
        self.to_dto(folder).await
    }

    pub async fn delete_folder(&self, caller: &Claims, id: &str) -> AppResult<()> {
        let folder = self.find_folder(id).await?;
        self.check_ownership(caller, &folder)?;

        let removed_tests = self.cascade.delete_folder_contents(&folder.id).await?;
        self.folders.delete(&folder.id).await?;

        log::info!(
            "Folder '{}' deleted by {} along with {} tests",
            folder.name,
            caller.username,
            removed_tests
        );
        Ok(())
    }

    /// Stateless join: nothing is recorded, the code must be presented again
    /// on every later request that needs it.
    pub async fn join_folder(&self, id: &str, code: &str) -> AppResult<FolderDto> {
        let folder = self.find_folder(id).await?;
        if !folder.code_matches(code) {
            return Err(AppError::WrongCode);
        }
        self.to_dto(folder).await
    }

    pub async fn find_folder(&self, id: &str) -> AppResult<Folder> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Folder with id '{}' not found", id)))
    }

    fn check_ownership(&self, caller: &Claims, folder: &Folder) -> AppResult<()> {
        if self.enforce_ownership {
            require_owner(caller, &folder.owner_id)?;
        }
        Ok(())
    }

    async fn to_dto(&self, folder: Folder) -> AppResult<FolderDto> {
        let owner = self.users.find_by_id(&folder.owner_id).await?;
        Ok(FolderDto::new(folder, owner))
    }
}
