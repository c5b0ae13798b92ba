use anyhow::Result;
use candle_core::{DType, Tensor};

/// Attention-masked mean over the token axis: `[B,T,H]` x `[B,T]` -> `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (_batch, _time, hidden_dim) = hidden.dims3()?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = mask_3d.broadcast_as(hidden.shape()).unwrap_or(mask_3d.repeat((1, 1, hidden_dim))?);
    let summed = (hidden * &mask_broadcast)?.sum(1)?;
    let counts = mask.sum(1)?.unsqueeze(1)?.to_dtype(summed.dtype())?;
    Ok(summed.broadcast_div(&counts)?)
}

/// L2-normalize each row of `[B,H]`. Guards against an all-zero row.
pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let eps_val = match rows.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let eps = Tensor::new(&[eps_val], rows.device())?.to_dtype(rows.dtype())?.unsqueeze(0)?;
    let norm = rows.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    Ok(rows.broadcast_div(&norm)?)
}
