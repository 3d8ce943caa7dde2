// saved_state.rs — XML store of custom profiles
//
// Layout:
//   <SavedState>
//     <CustomProfiles>
//       <Profile>
//         <Name>..</Name>
//         <FullDetailsString>..</FullDetailsString>
//         <PreviewDetailsString>..</PreviewDetailsString>
//         <InfoTipString>..</InfoTipString>
//       </Profile>
//     </CustomProfiles>
//   </SavedState>

use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::ehm::AppError;
use crate::profile::Profile;
use crate::usage;





const SAVED_STATE_TAG:     &str = "SavedState";
const CUSTOM_PROFILES_TAG: &str = "CustomProfiles";
const PROFILE_TAG:         &str = "Profile";
const NAME_TAG:            &str = "Name";
const FULL_DETAILS_TAG:    &str = "FullDetailsString";
const PREVIEW_DETAILS_TAG: &str = "PreviewDetailsString";
const INFO_TIP_TAG:        &str = "InfoTipString";





#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedState {
    pub custom_profiles: Vec<Profile>,
}





/// The four text fields of one <Profile> element.
#[derive(Default)]
struct ProfileFields {
    name:            String,
    full_details:    String,
    preview_details: String,
    info_tip:        String,
}



impl ProfileFields {
    fn field_mut(&mut self, tag: &str) -> Option<&mut String> {
        match tag {
            NAME_TAG            => Some(&mut self.name),
            FULL_DETAILS_TAG    => Some(&mut self.full_details),
            PREVIEW_DETAILS_TAG => Some(&mut self.preview_details),
            INFO_TIP_TAG        => Some(&mut self.info_tip),
            _ => None,
        }
    }



    fn into_profile(self) -> Profile {
        Profile::from_strings(self.name, &self.full_details, &self.preview_details, &self.info_tip)
    }
}





fn parse_error(detail: impl fmt::Display) -> AppError {
    log::warn!("Saved state: {}", detail);
    AppError::Xml(usage::XML_PARSE_ERROR.to_string())
}



fn write_error(detail: impl fmt::Display) -> AppError {
    log::warn!("Saved state: {}", detail);
    AppError::Xml(usage::XML_WRITE_ERROR.to_string())
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl SavedState
//
//  Loading and saving the custom-profile store.
//
////////////////////////////////////////////////////////////////////////////////

impl SavedState {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  load
    //
    //  Reads a store that must exist.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(AppError::PathNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let state = Self::from_xml(&content)?;

        log::info!("Loaded {} custom profiles from {}", state.custom_profiles.len(), path.display());
        Ok(state)
    }





    /// Reads a store, treating a missing file as empty.
    pub fn load_if_exists(path: &Path) -> Result<Self, AppError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  from_xml
    //
    //  Collects every <Profile> under <CustomProfiles>.  Unknown elements
    //  are ignored; malformed XML is an error.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn from_xml(content: &str) -> Result<Self, AppError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut state = SavedState::default();
        let mut current: Option<ProfileFields> = None;
        let mut field: Option<String> = None;
        let mut saw_root = false;

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                    if tag == SAVED_STATE_TAG {
                        saw_root = true;
                    } else if tag == PROFILE_TAG {
                        current = Some(ProfileFields::default());
                    } else if current.is_some() {
                        field = Some(tag);
                    }
                }
                Event::Empty(e) => {
                    if e.name().as_ref() == SAVED_STATE_TAG.as_bytes() {
                        saw_root = true;
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(parse_error)?;

                    if let (Some(fields), Some(tag)) = (current.as_mut(), field.as_deref()) {
                        if let Some(slot) = fields.field_mut(tag) {
                            slot.push_str(&text);
                        }
                    }
                }
                Event::End(e) => {
                    if e.name().as_ref() == PROFILE_TAG.as_bytes() {
                        if let Some(fields) = current.take() {
                            state.custom_profiles.push(fields.into_profile());
                        }
                    } else {
                        field = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(parse_error(format!("missing <{}> element", SAVED_STATE_TAG)));
        }

        Ok(state)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  to_xml
    //
    //  Serializes the store with two-space indentation.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn to_xml(&self) -> Result<String, AppError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_error)?;
        writer.write_event(Event::Start(BytesStart::new(SAVED_STATE_TAG))).map_err(write_error)?;
        writer.write_event(Event::Start(BytesStart::new(CUSTOM_PROFILES_TAG))).map_err(write_error)?;

        for profile in &self.custom_profiles {
            writer.write_event(Event::Start(BytesStart::new(PROFILE_TAG))).map_err(write_error)?;

            write_text_element(&mut writer, NAME_TAG,            &profile.name)?;
            write_text_element(&mut writer, FULL_DETAILS_TAG,    &profile.full_details_string())?;
            write_text_element(&mut writer, PREVIEW_DETAILS_TAG, &profile.preview_details_string())?;
            write_text_element(&mut writer, INFO_TIP_TAG,        &profile.info_tip_string())?;

            writer.write_event(Event::End(BytesEnd::new(PROFILE_TAG))).map_err(write_error)?;
        }

        writer.write_event(Event::End(BytesEnd::new(CUSTOM_PROFILES_TAG))).map_err(write_error)?;
        writer.write_event(Event::End(BytesEnd::new(SAVED_STATE_TAG))).map_err(write_error)?;

        String::from_utf8(writer.into_inner()).map_err(write_error)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  save
    //
    //  Writes the store, creating its folder if needed.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let xml = self.to_xml()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, xml).map_err(write_error)?;

        log::info!("Saved {} custom profiles to {}", self.custom_profiles.len(), path.display());
        Ok(())
    }
}





fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), AppError> {
    writer.write_event(Event::Start(BytesStart::new(tag))).map_err(write_error)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(write_error)?;
    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(write_error)?;
    Ok(())
}
