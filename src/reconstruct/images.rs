//! Replaying source images on the output page.
//!
//! Each distinct image is read from the source once and imported into the
//! output document once, with the objects its dictionary references. It is
//! then drawn at every rectangle it occupied on the source page. Image bytes
//! are copied as stored, filters included, and never re-encoded.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::output::OutputPage;
use crate::error::{Error, Result};
use crate::model::{BBox, ImageId, ImagePlacement, ImageReference};
use crate::parser::SourceDocument;

/// One image draw on the output page.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnImage {
    /// Image object in the source document
    pub source: ImageId,
    /// Resource name on the output page
    pub name: String,
    pub rect: BBox,
}

/// Imports objects from the source document into the output, remapping
/// references. Every source object is imported at most once.
pub(crate) struct ObjectImporter<'s> {
    source: &'s LopdfDocument,
    imported: HashMap<ObjectId, ObjectId>,
}

impl<'s> ObjectImporter<'s> {
    pub fn new(source: &'s LopdfDocument) -> Self {
        Self {
            source,
            imported: HashMap::new(),
        }
    }

    /// Import an image whose bytes were already read from the source.
    pub fn import_image(&mut self, target: &mut LopdfDocument, image: ImageReference) -> Result<ObjectId> {
        if let Some(id) = self.imported.get(&image.id) {
            return Ok(*id);
        }
        let new_id = target.new_object_id();
        self.imported.insert(image.id, new_id);

        let dict = self.remap_dict(target, image.dict)?;
        let mut stream = Stream::new(dict, image.data);
        stream.allows_compression = false;
        target.objects.insert(new_id, Object::Stream(stream));
        Ok(new_id)
    }

    fn import_object(&mut self, target: &mut LopdfDocument, id: ObjectId) -> Result<ObjectId> {
        if let Some(new_id) = self.imported.get(&id) {
            return Ok(*new_id);
        }
        let new_id = target.new_object_id();
        self.imported.insert(id, new_id);

        let object = self
            .source
            .get_object(id)
            .map_err(|e| Error::Reconstruction(format!("copying object {} {} R: {}", id.0, id.1, e)))?
            .clone();
        let object = match object {
            Object::Stream(mut stream) => {
                stream.dict = self.remap_dict(target, stream.dict)?;
                stream.allows_compression = false;
                Object::Stream(stream)
            }
            other => self.remap(target, other)?,
        };
        target.objects.insert(new_id, object);
        Ok(new_id)
    }

    fn remap(&mut self, target: &mut LopdfDocument, object: Object) -> Result<Object> {
        Ok(match object {
            Object::Reference(id) => Object::Reference(self.import_object(target, id)?),
            Object::Array(items) => Object::Array(
                items
                    .into_iter()
                    .map(|item| self.remap(target, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.remap_dict(target, dict)?),
            other => other,
        })
    }

    fn remap_dict(&mut self, target: &mut LopdfDocument, mut dict: Dictionary) -> Result<Dictionary> {
        for (_, value) in dict.iter_mut() {
            let taken = std::mem::replace(value, Object::Null);
            *value = self.remap(target, taken)?;
        }
        Ok(dict)
    }
}

/// Group placements by image, in order of first appearance.
pub(crate) fn group_placements(placements: &[ImagePlacement]) -> IndexMap<ImageId, Vec<&ImagePlacement>> {
    let mut groups: IndexMap<ImageId, Vec<&ImagePlacement>> = IndexMap::new();
    for placement in placements {
        groups.entry(placement.image).or_default().push(placement);
    }
    groups
}

/// Draw every placement on `output`.
///
/// Returns the number of distinct images imported and the draws made.
pub(crate) fn copy_images(
    source: &SourceDocument,
    placements: &[ImagePlacement],
    output: &mut OutputPage,
) -> Result<(usize, Vec<DrawnImage>)> {
    let groups = group_placements(placements);
    let mut importer = ObjectImporter::new(source.raw_doc());
    let mut drawn = Vec::with_capacity(placements.len());

    for (id, group) in &groups {
        let reference = source.image_reference(*id)?;
        log::debug!(
            "Image {} {} R: {} bytes, {} placements",
            id.0,
            id.1,
            reference.size(),
            group.len()
        );
        let new_id = importer.import_image(output.doc_mut(), reference)?;
        let name = output.add_image(new_id);

        for placement in group {
            output.draw_image(&name, &placement.rect);
            drawn.push(DrawnImage {
                source: *id,
                name: name.clone(),
                rect: placement.rect,
            });
        }
    }

    Ok((groups.len(), drawn))
}

/// Write each distinct image on `placements` to `dir` as stored.
///
/// Returns the written paths in order of first appearance.
pub fn extract_images_to_folder<P: AsRef<Path>>(
    source: &SourceDocument,
    placements: &[ImagePlacement],
    dir: P,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for id in group_placements(placements).keys() {
        let reference = source.image_reference(*id)?;
        let path = dir.join(reference.suggested_filename());
        fs::write(&path, &reference.data)?;
        log::info!("Exported {} ({})", path.display(), reference.mime_type());
        written.push(path);
    }
    Ok(written)
}
