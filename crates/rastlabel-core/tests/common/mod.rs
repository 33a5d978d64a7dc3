//! In-memory stand-in for a toolkit session.
//!
//! Implements just enough of each module used by the pipeline to check what
//! ends up in the database.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use rastlabel_core::error::{Result, ToolkitError};
use rastlabel_core::toolkit::{Invocation, Toolkit};

type Sampler = Box<dyn Fn(f64, f64) -> Option<(String, String)>>;

pub struct Raster {
    datatype: &'static str,
    sampler: Sampler,
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub columns: Vec<(String, String)>,
    pub rows: Vec<Vec<String>>,
    pub points: Vec<(f64, f64)>,
}

impl Layer {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn column_type(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_str())
    }

    pub fn values(&self, name: &str) -> Vec<String> {
        let idx = self
            .columns
            .iter()
            .position(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("no column {name}"));
        self.rows.iter().map(|r| r[idx].clone()).collect()
    }
}

#[derive(Default)]
struct State {
    vectors: BTreeMap<String, Layer>,
    rasters: BTreeMap<String, Raster>,
    indexes: Vec<String>,
    history: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct FakeGrass {
    state: RefCell<State>,
    calls: RefCell<Vec<Invocation>>,
}

fn base_name(name: &str) -> String {
    name.split('@').next().unwrap_or_default().to_string()
}

fn fail(module: &str, stderr: impl Into<String>) -> rastlabel_core::error::RastLabelError {
    ToolkitError::Failed {
        module: module.to_string(),
        status: Some(1),
        stderr: stderr.into(),
    }
    .into()
}

impl FakeGrass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point map with a bare `cat` table.
    pub fn with_points(self, name: &str, points: &[(f64, f64)]) -> Self {
        let layer = Layer {
            columns: vec![("cat".to_string(), "INTEGER".to_string())],
            rows: (1..=points.len()).map(|c| vec![c.to_string()]).collect(),
            points: points.to_vec(),
        };
        self.state.borrow_mut().vectors.insert(name.to_string(), layer);
        self
    }

    pub fn with_raster(
        self,
        name: &str,
        datatype: &'static str,
        sampler: impl Fn(f64, f64) -> Option<(String, String)> + 'static,
    ) -> Self {
        self.state.borrow_mut().rasters.insert(
            name.to_string(),
            Raster {
                datatype,
                sampler: Box::new(sampler),
            },
        );
        self
    }

    pub fn vector(&self, name: &str) -> Option<Layer> {
        self.state.borrow().vectors.get(name).cloned()
    }

    pub fn vector_names(&self) -> Vec<String> {
        self.state.borrow().vectors.keys().cloned().collect()
    }

    pub fn history(&self, name: &str) -> Option<String> {
        self.state.borrow().history.get(name).cloned()
    }

    pub fn indexes(&self) -> Vec<String> {
        self.state.borrow().indexes.clone()
    }

    pub fn modules(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.module().to_string())
            .collect()
    }

    fn param<'a>(inv: &'a Invocation, key: &str) -> Result<&'a str> {
        inv.get(key)
            .ok_or_else(|| fail(inv.module(), format!("missing {key}=")))
    }

    fn sample(&self, raster: &str, x: f64, y: f64) -> Result<Option<(String, String)>> {
        let state = self.state.borrow();
        let raster = state
            .rasters
            .get(&base_name(raster))
            .ok_or_else(|| fail("r.what", format!("Raster map <{raster}> not found")))?;
        Ok((raster.sampler)(x, y))
    }

    fn layer_mut<R>(&self, module: &str, map: &str, f: impl FnOnce(&mut Layer) -> R) -> Result<R> {
        let mut state = self.state.borrow_mut();
        let layer = state
            .vectors
            .get_mut(&base_name(map))
            .ok_or_else(|| fail(module, format!("Vector map <{map}> not found")))?;
        Ok(f(layer))
    }
}

impl Toolkit for FakeGrass {
    fn run(&self, inv: &Invocation) -> Result<String> {
        self.calls.borrow_mut().push(inv.clone());
        match inv.module() {
            "r.info" => {
                let map = Self::param(inv, "map")?;
                let state = self.state.borrow();
                let raster = state
                    .rasters
                    .get(&base_name(map))
                    .ok_or_else(|| fail("r.info", format!("Raster map <{map}> not found")))?;
                Ok(format!("north=100\nsouth=0\ndatatype={}\n", raster.datatype))
            },
            "v.out.ascii" => {
                let layer = self
                    .vector(&base_name(Self::param(inv, "input")?))
                    .ok_or_else(|| fail("v.out.ascii", "Vector map not found"))?;
                Ok(layer
                    .points
                    .iter()
                    .zip(&layer.rows)
                    .map(|((x, y), row)| format!("{x} {y} {}\n", row[0]))
                    .collect())
            },
            "r.what" => {
                let maps: Vec<&str> = Self::param(inv, "map")?.split(',').collect();
                let mut out = String::new();
                for line in inv.input().unwrap_or_default().lines() {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    let (x, y) = (fields[0].parse().unwrap(), fields[1].parse().unwrap());
                    out.push_str(&format!("{}|{}|{}", fields[0], fields[1], fields[2]));
                    for map in &maps {
                        match self.sample(map, x, y)? {
                            Some((value, label)) => out.push_str(&format!("|{value}|{label}")),
                            None => out.push_str("|*|"),
                        }
                    }
                    out.push('\n');
                }
                Ok(out)
            },
            "v.in.ascii" => {
                let output = Self::param(inv, "output")?.to_string();
                if self.state.borrow().vectors.contains_key(&output) && !inv.is_overwrite() {
                    return Err(fail("v.in.ascii", format!("<{output}> already exists")));
                }
                let mut columns = vec![("cat".to_string(), "INTEGER".to_string())];
                for decl in Self::param(inv, "columns")?.split(',') {
                    let (name, ty) = decl.trim().split_once(' ').unwrap();
                    columns.push((name.to_string(), ty.to_string()));
                }
                let mut layer = Layer {
                    columns,
                    ..Layer::default()
                };
                for (i, line) in inv.input().unwrap_or_default().lines().enumerate() {
                    let mut row = vec![(i + 1).to_string()];
                    row.extend(line.split('|').map(String::from));
                    if row.len() != layer.columns.len() {
                        return Err(fail("v.in.ascii", format!("bad field count in '{line}'")));
                    }
                    layer
                        .points
                        .push((row[1].parse().unwrap(), row[2].parse().unwrap()));
                    layer.rows.push(row);
                }
                self.state.borrow_mut().vectors.insert(output, layer);
                Ok(String::new())
            },
            "v.db.addcolumn" => {
                let decl = Self::param(inv, "columns")?;
                let (name, ty) = decl.split_once(' ').unwrap();
                self.layer_mut("v.db.addcolumn", Self::param(inv, "map")?, |layer| {
                    layer.columns.push((name.to_string(), ty.to_string()));
                    for row in &mut layer.rows {
                        row.push(String::new());
                    }
                })?;
                Ok(String::new())
            },
            "v.what.rast" => {
                let map = Self::param(inv, "map")?;
                let raster = Self::param(inv, "raster")?;
                let column = Self::param(inv, "column")?;
                let layer = self
                    .vector(&base_name(map))
                    .ok_or_else(|| fail("v.what.rast", "Vector map not found"))?;
                let idx = layer
                    .columns
                    .iter()
                    .position(|(n, _)| n == column)
                    .ok_or_else(|| fail("v.what.rast", format!("Column <{column}> not found")))?;
                let mut values = Vec::new();
                for (x, y) in &layer.points {
                    values.push(self.sample(raster, *x, *y)?.map(|(v, _)| v).unwrap_or_default());
                }
                self.layer_mut("v.what.rast", map, |layer| {
                    for (row, value) in layer.rows.iter_mut().zip(values) {
                        row[idx] = value;
                    }
                })?;
                Ok(String::new())
            },
            "db.columns" => {
                let layer = self
                    .vector(Self::param(inv, "table")?)
                    .ok_or_else(|| fail("db.columns", "Table not found"))?;
                Ok(layer.column_names().iter().map(|n| format!("{n}\n")).collect())
            },
            "v.info" => {
                let layer = self
                    .vector(&base_name(Self::param(inv, "map")?))
                    .ok_or_else(|| fail("v.info", "Vector map not found"))?;
                Ok(layer
                    .columns
                    .iter()
                    .map(|(n, t)| format!("{}|{n}\n", t.to_uppercase()))
                    .collect())
            },
            "db.execute" => {
                let sql = Self::param(inv, "sql")?.to_string();
                self.state.borrow_mut().indexes.push(sql);
                Ok(String::new())
            },
            "v.db.join" => {
                let other = self
                    .vector(Self::param(inv, "other_table")?)
                    .ok_or_else(|| fail("v.db.join", "Table not found"))?;
                let key = Self::param(inv, "column")?;
                let other_key = other
                    .columns
                    .iter()
                    .position(|(n, _)| n == Self::param(inv, "other_column").unwrap_or_default())
                    .ok_or_else(|| fail("v.db.join", "Join column not found"))?;
                let subset: Vec<String> = Self::param(inv, "subset_columns")?
                    .split(',')
                    .map(String::from)
                    .collect();
                self.layer_mut("v.db.join", Self::param(inv, "map")?, |layer| {
                    let key_idx = layer.columns.iter().position(|(n, _)| n == key).unwrap();
                    for name in &subset {
                        let src = other.columns.iter().position(|(n, _)| n == name).unwrap();
                        let dst = match layer.columns.iter().position(|(n, _)| n == name) {
                            Some(i) => i,
                            None => {
                                layer.columns.push(other.columns[src].clone());
                                for row in &mut layer.rows {
                                    row.push(String::new());
                                }
                                layer.columns.len() - 1
                            },
                        };
                        for row in &mut layer.rows {
                            let matched = other.rows.iter().find(|o| o[other_key] == row[key_idx]);
                            if let Some(o) = matched {
                                row[dst] = o[src].clone();
                            }
                        }
                    }
                })?;
                Ok(String::new())
            },
            "v.support" => {
                let map = Self::param(inv, "map")?.to_string();
                let hist = Self::param(inv, "cmdhist")?.to_string();
                self.state.borrow_mut().history.insert(map, hist);
                Ok(String::new())
            },
            "g.remove" => {
                let name = Self::param(inv, "name")?;
                self.state.borrow_mut().vectors.remove(name);
                Ok(String::new())
            },
            other => Err(fail(other, "unknown module")),
        }
    }
}
